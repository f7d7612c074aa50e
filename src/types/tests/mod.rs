// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

use std::fmt::Debug;
use std::io::Cursor;

use crate::types::*;

mod date_time;
mod encoding;

/// Encodes the value, decodes it back out and expects the result to be
/// identical to the input. The encoded length is expected to match
/// `byte_len` exactly.
pub fn serialize_test<T>(value: T)
where
    T: BinaryEncoder<T> + Debug + PartialEq,
{
    let buf = value.encode_to_vec();
    assert_eq!(buf.len(), value.byte_len());

    let decoding_options = DecodingOptions::test();
    let mut stream = Cursor::new(buf);
    let new_value: T = T::decode(&mut stream, &decoding_options).unwrap();
    assert_eq!(value, new_value);
}

pub fn serialize_and_compare<T>(value: T, expected: &[u8])
where
    T: BinaryEncoder<T> + Debug + PartialEq,
{
    let buf = value.encode_to_vec();
    assert_eq!(&buf[..], expected);
}

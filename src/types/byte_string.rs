// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Contains the implementation of `ByteString`.

use std::io::{Read, Write};

use crate::types::{encoding::*, status_codes::StatusCode};

/// A sequence of octets. A null byte string is distinct from an empty one, the
/// same way a null `UAString` is distinct from an empty string.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct ByteString {
    pub value: Option<Vec<u8>>,
}

impl BinaryEncoder<ByteString> for ByteString {
    fn byte_len(&self) -> usize {
        // Length plus the actual length of bytes (if not null)
        4 + match self.value {
            Some(ref value) => value.len(),
            None => 0,
        }
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        // Byte strings are encoded as an i32 length followed by the bytes. A -1 indicates null
        match self.value {
            None => write_i32(stream, -1),
            Some(ref value) => {
                let mut size: usize = 0;
                size += write_i32(stream, value.len() as i32)?;
                size += process_encode_io_result(stream.write(value))?;
                assert_eq!(size, self.byte_len());
                Ok(size)
            }
        }
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let len = read_i32(stream)?;
        // Null string?
        if len == -1 {
            Ok(ByteString::null())
        } else if len < -1 {
            error!("ByteString length is a negative number {}", len);
            Err(StatusCode::BadDecodingError)
        } else if len as usize > decoding_options.max_byte_string_length {
            error!(
                "ByteString length {} exceeds decoding limit {}",
                len, decoding_options.max_byte_string_length
            );
            Err(StatusCode::BadDecodingError)
        } else {
            // Create a buffer filled with zeroes and read the byte string over the top
            let mut buf = vec![0u8; len as usize];
            process_decode_io_result(stream.read_exact(&mut buf))?;
            Ok(ByteString { value: Some(buf) })
        }
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        if self.value.is_none() {
            &[]
        } else {
            self.value.as_ref().unwrap()
        }
    }
}

impl<'a, T> From<&'a T> for ByteString
where
    T: AsRef<[u8]> + ?Sized,
{
    fn from(value: &'a T) -> Self {
        Self::from(value.as_ref().to_vec())
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(value: Vec<u8>) -> Self {
        ByteString { value: Some(value) }
    }
}

impl Default for ByteString {
    fn default() -> Self {
        ByteString::null()
    }
}

impl ByteString {
    /// Create a null byte string (not the same as an empty byte string).
    pub fn null() -> ByteString {
        ByteString { value: None }
    }

    /// Test if the byte string is null.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Test if the byte string is null or empty.
    pub fn is_empty(&self) -> bool {
        match self.value {
            None => true,
            Some(ref v) => v.is_empty(),
        }
    }

    /// Returns the length of the byte string in bytes or -1 for null.
    pub fn len(&self) -> isize {
        match self.value {
            None => -1,
            Some(ref v) => v.len() as isize,
        }
    }
}

#[test]
fn byte_string_null() {
    let v = ByteString::null();
    assert!(v.is_null());
    assert!(v.is_empty());
    assert_eq!(v.len(), -1);
    assert_eq!(v.as_ref(), &[] as &[u8]);
}

#[test]
fn byte_string_value() {
    let v = ByteString::from(&[0x1u8, 0x2, 0x3]);
    assert!(!v.is_null());
    assert!(!v.is_empty());
    assert_eq!(v.len(), 3);
    assert_eq!(v.as_ref(), &[0x1u8, 0x2, 0x3]);
}

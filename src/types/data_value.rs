// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Contains the implementation of `DataValue`.

use std::io::{Read, Write};

use crate::types::{
    date_time::DateTime, encoding::*, status_codes::StatusCode, variant::Variant, UtcTime,
};

bitflags! {
    struct DataValueFlags: u8 {
        /// False if the Value is Null.
        const HAS_VALUE = 0x1;
        /// False if the StatusCode is Good.
        const HAS_STATUS = 0x2;
        /// False if the source timestamp is DateTime.MinValue.
        const HAS_SOURCE_TIMESTAMP = 0x4;
        /// False if the server timestamp is DateTime.MinValue.
        const HAS_SERVER_TIMESTAMP = 0x8;
        /// False if the source picoseconds are 0.
        const HAS_SOURCE_PICOSECONDS = 0x10;
        /// False if the server picoseconds are 0.
        const HAS_SERVER_PICOSECONDS = 0x20;
    }
}

/// An attribute value together with its quality and timestamps. Every field is
/// optional on the wire, signalled by the leading encoding mask byte.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    /// The value. BaseDataType encoded as a Variant.
    pub value: Option<Variant>,
    /// The status associated with the value. Omitted when Good.
    pub status: Option<StatusCode>,
    /// The source timestamp associated with the value.
    pub source_timestamp: Option<UtcTime>,
    /// The number of 10 picosecond intervals for the source timestamp.
    pub source_picoseconds: Option<u16>,
    /// The server timestamp associated with the value.
    pub server_timestamp: Option<UtcTime>,
    /// The number of 10 picosecond intervals for the server timestamp.
    pub server_picoseconds: Option<u16>,
}

impl BinaryEncoder<DataValue> for DataValue {
    fn byte_len(&self) -> usize {
        let mut size = 1;
        let encoding_mask = self.encoding_mask();
        if encoding_mask.contains(DataValueFlags::HAS_VALUE) {
            size += self.value.as_ref().unwrap().byte_len();
        }
        if encoding_mask.contains(DataValueFlags::HAS_STATUS) {
            size += self.status.as_ref().unwrap().byte_len();
        }
        if encoding_mask.contains(DataValueFlags::HAS_SOURCE_TIMESTAMP) {
            size += self.source_timestamp.as_ref().unwrap().byte_len();
            if encoding_mask.contains(DataValueFlags::HAS_SOURCE_PICOSECONDS) {
                size += self.source_picoseconds.as_ref().unwrap().byte_len();
            }
        }
        if encoding_mask.contains(DataValueFlags::HAS_SERVER_TIMESTAMP) {
            size += self.server_timestamp.as_ref().unwrap().byte_len();
            if encoding_mask.contains(DataValueFlags::HAS_SERVER_PICOSECONDS) {
                size += self.server_picoseconds.as_ref().unwrap().byte_len();
            }
        }
        size
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut size = 0;
        let encoding_mask = self.encoding_mask();
        size += encoding_mask.bits().encode(stream)?;
        if encoding_mask.contains(DataValueFlags::HAS_VALUE) {
            size += self.value.as_ref().unwrap().encode(stream)?;
        }
        if encoding_mask.contains(DataValueFlags::HAS_STATUS) {
            size += self.status.as_ref().unwrap().encode(stream)?;
        }
        if encoding_mask.contains(DataValueFlags::HAS_SOURCE_TIMESTAMP) {
            size += self.source_timestamp.as_ref().unwrap().encode(stream)?;
            if encoding_mask.contains(DataValueFlags::HAS_SOURCE_PICOSECONDS) {
                size += self.source_picoseconds.as_ref().unwrap().encode(stream)?;
            }
        }
        if encoding_mask.contains(DataValueFlags::HAS_SERVER_TIMESTAMP) {
            size += self.server_timestamp.as_ref().unwrap().encode(stream)?;
            if encoding_mask.contains(DataValueFlags::HAS_SERVER_PICOSECONDS) {
                size += self.server_picoseconds.as_ref().unwrap().encode(stream)?;
            }
        }
        assert_eq!(size, self.byte_len());
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let encoding_mask =
            DataValueFlags::from_bits_truncate(u8::decode(stream, decoding_options)?);

        let value = if encoding_mask.contains(DataValueFlags::HAS_VALUE) {
            Some(Variant::decode(stream, decoding_options)?)
        } else {
            None
        };
        let status = if encoding_mask.contains(DataValueFlags::HAS_STATUS) {
            Some(StatusCode::decode(stream, decoding_options)?)
        } else {
            None
        };
        let (source_timestamp, source_picoseconds) =
            if encoding_mask.contains(DataValueFlags::HAS_SOURCE_TIMESTAMP) {
                let source_timestamp = DateTime::decode(stream, decoding_options)?;
                let source_picoseconds =
                    if encoding_mask.contains(DataValueFlags::HAS_SOURCE_PICOSECONDS) {
                        Some(u16::decode(stream, decoding_options)?)
                    } else {
                        None
                    };
                (Some(source_timestamp), source_picoseconds)
            } else {
                (None, None)
            };
        let (server_timestamp, server_picoseconds) =
            if encoding_mask.contains(DataValueFlags::HAS_SERVER_TIMESTAMP) {
                let server_timestamp = DateTime::decode(stream, decoding_options)?;
                let server_picoseconds =
                    if encoding_mask.contains(DataValueFlags::HAS_SERVER_PICOSECONDS) {
                        Some(u16::decode(stream, decoding_options)?)
                    } else {
                        None
                    };
                (Some(server_timestamp), server_picoseconds)
            } else {
                (None, None)
            };

        Ok(DataValue {
            value,
            status,
            source_timestamp,
            source_picoseconds,
            server_timestamp,
            server_picoseconds,
        })
    }
}

impl From<Variant> for DataValue {
    fn from(value: Variant) -> Self {
        DataValue {
            value: Some(value),
            ..Default::default()
        }
    }
}

impl DataValue {
    /// Creates a data value with nothing set
    pub fn null() -> DataValue {
        DataValue::default()
    }

    /// Returns the status code, or Good when none is carried
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::Good)
    }

    /// Tests if the value held is valid, i.e. the status is absent or good
    pub fn is_valid(&self) -> bool {
        self.status().is_good()
    }

    fn encoding_mask(&self) -> DataValueFlags {
        let mut encoding_mask = DataValueFlags::empty();
        if self.value.is_some() {
            encoding_mask |= DataValueFlags::HAS_VALUE;
        }
        if self.status.is_some() {
            encoding_mask |= DataValueFlags::HAS_STATUS;
        }
        if self.source_timestamp.is_some() {
            encoding_mask |= DataValueFlags::HAS_SOURCE_TIMESTAMP;
            if self.source_picoseconds.is_some() {
                encoding_mask |= DataValueFlags::HAS_SOURCE_PICOSECONDS;
            }
        }
        if self.server_timestamp.is_some() {
            encoding_mask |= DataValueFlags::HAS_SERVER_TIMESTAMP;
            if self.server_picoseconds.is_some() {
                encoding_mask |= DataValueFlags::HAS_SERVER_PICOSECONDS;
            }
        }
        encoding_mask
    }
}

// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Contains the implementation of `Variant`, the discriminated union over the
//! built-in types that attribute values are carried in.

use std::io::{Read, Write};

use crate::types::{
    byte_string::ByteString,
    date_time::DateTime,
    encoding::*,
    extension_object::ExtensionObject,
    guid::Guid,
    localized_text::LocalizedText,
    node_id::{ExpandedNodeId, NodeId},
    qualified_name::QualifiedName,
    status_codes::StatusCode,
    string::UAString,
};

/// The encoding mask values for each of the built-in types a variant can hold.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum VariantTypeId {
    Boolean = 1,
    SByte = 2,
    Byte = 3,
    Int16 = 4,
    UInt16 = 5,
    Int32 = 6,
    UInt32 = 7,
    Int64 = 8,
    UInt64 = 9,
    Float = 10,
    Double = 11,
    String = 12,
    DateTime = 13,
    Guid = 14,
    ByteString = 15,
    NodeId = 17,
    ExpandedNodeId = 18,
    StatusCode = 19,
    QualifiedName = 20,
    LocalizedText = 21,
    ExtensionObject = 22,
}

impl VariantTypeId {
    fn from_encoding_mask(value: u8) -> EncodingResult<Self> {
        let type_id = match value {
            1 => VariantTypeId::Boolean,
            2 => VariantTypeId::SByte,
            3 => VariantTypeId::Byte,
            4 => VariantTypeId::Int16,
            5 => VariantTypeId::UInt16,
            6 => VariantTypeId::Int32,
            7 => VariantTypeId::UInt32,
            8 => VariantTypeId::Int64,
            9 => VariantTypeId::UInt64,
            10 => VariantTypeId::Float,
            11 => VariantTypeId::Double,
            12 => VariantTypeId::String,
            13 => VariantTypeId::DateTime,
            14 => VariantTypeId::Guid,
            15 => VariantTypeId::ByteString,
            17 => VariantTypeId::NodeId,
            18 => VariantTypeId::ExpandedNodeId,
            19 => VariantTypeId::StatusCode,
            20 => VariantTypeId::QualifiedName,
            21 => VariantTypeId::LocalizedText,
            22 => VariantTypeId::ExtensionObject,
            _ => {
                error!("Unrecognized variant type id {}", value);
                return Err(StatusCode::BadDecodingError);
            }
        };
        Ok(type_id)
    }
}

/// A `Variant` holds a scalar built-in value or a one dimensional array of
/// them. An empty variant means no value.
#[derive(PartialEq, Debug, Clone, Default)]
pub enum Variant {
    /// Empty type has no value
    #[default]
    Empty,
    Boolean(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(UAString),
    DateTime(Box<DateTime>),
    Guid(Box<Guid>),
    StatusCode(StatusCode),
    ByteString(ByteString),
    QualifiedName(Box<QualifiedName>),
    LocalizedText(Box<LocalizedText>),
    NodeId(Box<NodeId>),
    ExpandedNodeId(Box<ExpandedNodeId>),
    ExtensionObject(Box<ExtensionObject>),
    /// A one dimensional array where every element has the same type
    Array(VariantTypeId, Vec<Variant>),
}

const ARRAY_VALUES_BIT: u8 = 1 << 7;

impl BinaryEncoder<Variant> for Variant {
    fn byte_len(&self) -> usize {
        let mut size: usize = 1;
        size += match self {
            Variant::Empty => 0,
            Variant::Array(_, values) => {
                4 + values.iter().map(|v| v.value_byte_len()).sum::<usize>()
            }
            other => other.value_byte_len(),
        };
        size
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut size: usize = 0;
        size += write_u8(stream, self.encoding_mask())?;
        match self {
            Variant::Empty => {}
            Variant::Array(type_id, values) => {
                size += write_i32(stream, values.len() as i32)?;
                for value in values {
                    if value.type_id() != Some(*type_id) {
                        error!("Variant array contains mixed element types");
                        return Err(StatusCode::BadEncodingError);
                    }
                    size += value.encode_value(stream)?;
                }
            }
            other => {
                size += other.encode_value(stream)?;
            }
        }
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let encoding_mask = u8::decode(stream, decoding_options)?;
        if encoding_mask == 0 {
            return Ok(Variant::Empty);
        }
        let type_id = VariantTypeId::from_encoding_mask(encoding_mask & !ARRAY_VALUES_BIT)?;
        if encoding_mask & ARRAY_VALUES_BIT != 0 {
            let len = read_i32(stream)?;
            if len == -1 {
                return Ok(Variant::Array(type_id, Vec::new()));
            }
            if len < -1 {
                error!("Variant array length is negative and invalid");
                return Err(StatusCode::BadDecodingError);
            }
            if len as usize > decoding_options.max_array_length {
                error!(
                    "Variant array length {} exceeds decoding limit {}",
                    len, decoding_options.max_array_length
                );
                return Err(StatusCode::BadDecodingError);
            }
            let mut values = Vec::with_capacity(len as usize);
            for _ in 0..len {
                values.push(Variant::decode_value(type_id, stream, decoding_options)?);
            }
            Ok(Variant::Array(type_id, values))
        } else {
            Variant::decode_value(type_id, stream, decoding_options)
        }
    }
}

impl Variant {
    /// Test for an empty (null) variant
    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    /// The encoding mask that identifies the variant's content on the wire
    fn encoding_mask(&self) -> u8 {
        match self {
            Variant::Empty => 0,
            Variant::Array(type_id, _) => *type_id as u8 | ARRAY_VALUES_BIT,
            other => other.type_id().unwrap() as u8,
        }
    }

    /// The type id of the contained value, or `None` for empty / array variants
    pub fn type_id(&self) -> Option<VariantTypeId> {
        let type_id = match self {
            Variant::Boolean(_) => VariantTypeId::Boolean,
            Variant::SByte(_) => VariantTypeId::SByte,
            Variant::Byte(_) => VariantTypeId::Byte,
            Variant::Int16(_) => VariantTypeId::Int16,
            Variant::UInt16(_) => VariantTypeId::UInt16,
            Variant::Int32(_) => VariantTypeId::Int32,
            Variant::UInt32(_) => VariantTypeId::UInt32,
            Variant::Int64(_) => VariantTypeId::Int64,
            Variant::UInt64(_) => VariantTypeId::UInt64,
            Variant::Float(_) => VariantTypeId::Float,
            Variant::Double(_) => VariantTypeId::Double,
            Variant::String(_) => VariantTypeId::String,
            Variant::DateTime(_) => VariantTypeId::DateTime,
            Variant::Guid(_) => VariantTypeId::Guid,
            Variant::StatusCode(_) => VariantTypeId::StatusCode,
            Variant::ByteString(_) => VariantTypeId::ByteString,
            Variant::QualifiedName(_) => VariantTypeId::QualifiedName,
            Variant::LocalizedText(_) => VariantTypeId::LocalizedText,
            Variant::NodeId(_) => VariantTypeId::NodeId,
            Variant::ExpandedNodeId(_) => VariantTypeId::ExpandedNodeId,
            Variant::ExtensionObject(_) => VariantTypeId::ExtensionObject,
            Variant::Empty | Variant::Array(_, _) => return None,
        };
        Some(type_id)
    }

    fn value_byte_len(&self) -> usize {
        match self {
            Variant::Empty | Variant::Array(_, _) => 0,
            Variant::Boolean(v) => v.byte_len(),
            Variant::SByte(v) => v.byte_len(),
            Variant::Byte(v) => v.byte_len(),
            Variant::Int16(v) => v.byte_len(),
            Variant::UInt16(v) => v.byte_len(),
            Variant::Int32(v) => v.byte_len(),
            Variant::UInt32(v) => v.byte_len(),
            Variant::Int64(v) => v.byte_len(),
            Variant::UInt64(v) => v.byte_len(),
            Variant::Float(v) => v.byte_len(),
            Variant::Double(v) => v.byte_len(),
            Variant::String(v) => v.byte_len(),
            Variant::DateTime(v) => v.byte_len(),
            Variant::Guid(v) => v.byte_len(),
            Variant::StatusCode(v) => v.byte_len(),
            Variant::ByteString(v) => v.byte_len(),
            Variant::QualifiedName(v) => v.byte_len(),
            Variant::LocalizedText(v) => v.byte_len(),
            Variant::NodeId(v) => v.byte_len(),
            Variant::ExpandedNodeId(v) => v.byte_len(),
            Variant::ExtensionObject(v) => v.byte_len(),
        }
    }

    fn encode_value<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        match self {
            Variant::Empty | Variant::Array(_, _) => Ok(0),
            Variant::Boolean(v) => v.encode(stream),
            Variant::SByte(v) => v.encode(stream),
            Variant::Byte(v) => v.encode(stream),
            Variant::Int16(v) => v.encode(stream),
            Variant::UInt16(v) => v.encode(stream),
            Variant::Int32(v) => v.encode(stream),
            Variant::UInt32(v) => v.encode(stream),
            Variant::Int64(v) => v.encode(stream),
            Variant::UInt64(v) => v.encode(stream),
            Variant::Float(v) => v.encode(stream),
            Variant::Double(v) => v.encode(stream),
            Variant::String(v) => v.encode(stream),
            Variant::DateTime(v) => v.encode(stream),
            Variant::Guid(v) => v.encode(stream),
            Variant::StatusCode(v) => v.encode(stream),
            Variant::ByteString(v) => v.encode(stream),
            Variant::QualifiedName(v) => v.encode(stream),
            Variant::LocalizedText(v) => v.encode(stream),
            Variant::NodeId(v) => v.encode(stream),
            Variant::ExpandedNodeId(v) => v.encode(stream),
            Variant::ExtensionObject(v) => v.encode(stream),
        }
    }

    fn decode_value<S: Read>(
        type_id: VariantTypeId,
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Variant> {
        let value = match type_id {
            VariantTypeId::Boolean => Variant::Boolean(bool::decode(stream, decoding_options)?),
            VariantTypeId::SByte => Variant::SByte(i8::decode(stream, decoding_options)?),
            VariantTypeId::Byte => Variant::Byte(u8::decode(stream, decoding_options)?),
            VariantTypeId::Int16 => Variant::Int16(i16::decode(stream, decoding_options)?),
            VariantTypeId::UInt16 => Variant::UInt16(u16::decode(stream, decoding_options)?),
            VariantTypeId::Int32 => Variant::Int32(i32::decode(stream, decoding_options)?),
            VariantTypeId::UInt32 => Variant::UInt32(u32::decode(stream, decoding_options)?),
            VariantTypeId::Int64 => Variant::Int64(i64::decode(stream, decoding_options)?),
            VariantTypeId::UInt64 => Variant::UInt64(u64::decode(stream, decoding_options)?),
            VariantTypeId::Float => Variant::Float(f32::decode(stream, decoding_options)?),
            VariantTypeId::Double => Variant::Double(f64::decode(stream, decoding_options)?),
            VariantTypeId::String => Variant::String(UAString::decode(stream, decoding_options)?),
            VariantTypeId::DateTime => {
                Variant::DateTime(Box::new(DateTime::decode(stream, decoding_options)?))
            }
            VariantTypeId::Guid => Variant::Guid(Box::new(Guid::decode(stream, decoding_options)?)),
            VariantTypeId::StatusCode => {
                Variant::StatusCode(StatusCode::decode(stream, decoding_options)?)
            }
            VariantTypeId::ByteString => {
                Variant::ByteString(ByteString::decode(stream, decoding_options)?)
            }
            VariantTypeId::QualifiedName => {
                Variant::QualifiedName(Box::new(QualifiedName::decode(stream, decoding_options)?))
            }
            VariantTypeId::LocalizedText => {
                Variant::LocalizedText(Box::new(LocalizedText::decode(stream, decoding_options)?))
            }
            VariantTypeId::NodeId => {
                Variant::NodeId(Box::new(NodeId::decode(stream, decoding_options)?))
            }
            VariantTypeId::ExpandedNodeId => {
                Variant::ExpandedNodeId(Box::new(ExpandedNodeId::decode(stream, decoding_options)?))
            }
            VariantTypeId::ExtensionObject => Variant::ExtensionObject(Box::new(
                ExtensionObject::decode(stream, decoding_options)?,
            )),
        };
        Ok(value)
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Boolean(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Variant::Int32(v)
    }
}

impl From<u32> for Variant {
    fn from(v: u32) -> Self {
        Variant::UInt32(v)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Variant::Double(v)
    }
}

impl<'a> From<&'a str> for Variant {
    fn from(v: &'a str) -> Self {
        Variant::String(UAString::from(v))
    }
}

impl From<UAString> for Variant {
    fn from(v: UAString) -> Self {
        Variant::String(v)
    }
}

impl From<NodeId> for Variant {
    fn from(v: NodeId) -> Self {
        Variant::NodeId(Box::new(v))
    }
}

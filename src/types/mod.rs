// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The OPC UA binary codec and the types it carries.
//!
//! Everything that goes on the wire implements [`BinaryEncoder`] - the
//! built-in types defined by Part 6 of the specification, the service
//! request / response structures from Part 4, and the headers common to all
//! of them. Byte order is little-endian throughout. Strings, byte strings
//! and arrays carry an `i32` length prefix where -1 means null.

mod byte_string;
mod data_value;
mod date_time;
mod diagnostic_info;
mod extension_object;
mod guid;
mod localized_text;
mod node_id;
mod qualified_name;
mod request_header;
mod response_header;
mod status_codes;
mod string;
mod variant;

pub mod basic_types;
pub mod constants;
pub mod encoding;
pub mod node_ids;
pub mod service_types;

#[cfg(test)]
mod tests;

pub use byte_string::ByteString;
pub use data_value::DataValue;
pub use date_time::DateTime;
pub use diagnostic_info::{DiagnosticBits, DiagnosticInfo};
pub use encoding::{
    read_array, write_array, BinaryEncoder, DecodingOptions, EncodingResult,
};
pub use extension_object::{ExtensionObject, ExtensionObjectEncoding};
pub use guid::Guid;
pub use localized_text::LocalizedText;
pub use node_id::{ExpandedNodeId, Identifier, NodeId};
pub use node_ids::ObjectId;
pub use qualified_name::QualifiedName;
pub use request_header::RequestHeader;
pub use response_header::ResponseHeader;
pub use service_types::*;
pub use status_codes::StatusCode;
pub use string::{UAString, XmlElement};
pub use variant::{Variant, VariantTypeId};

/// OPC UA type alias for a millisecond duration carried as `f64`.
pub type Duration = f64;

/// OPC UA type alias for a UTC timestamp.
pub type UtcTime = DateTime;

/// OPC UA type alias for a handle that correlates requests and responses.
pub type IntegerId = u32;

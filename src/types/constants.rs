// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Limits applied while encoding and decoding, see [`crate::types::DecodingOptions`].

/// Maximum number of chunks either direction will accumulate for one message. 0 = no limit.
pub const MAX_CHUNK_COUNT: usize = 5;
/// Maximum size in bytes of a reassembled message. 0 = no limit.
pub const MAX_MESSAGE_SIZE: usize = 327_675;
/// Maximum length in bytes of a decoded string.
pub const MAX_STRING_LENGTH: usize = 65_535;
/// Maximum length in bytes of a decoded byte string.
pub const MAX_BYTE_STRING_LENGTH: usize = 65_535;
/// Maximum number of elements in a decoded array.
pub const MAX_ARRAY_LENGTH: usize = 1000;

/// URI of the only security policy this stack implements.
pub const SECURITY_POLICY_NONE_URI: &str = "http://opcfoundation.org/UA/SecurityPolicy#None";
/// Policy id servers conventionally assign to the anonymous user token.
pub const ANONYMOUS_POLICY_ID: &str = "anonymous";

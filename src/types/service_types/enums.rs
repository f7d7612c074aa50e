// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Enumerations used by the service types. Enumerations encode as 32-bit
//! little-endian integers.

use std::io::{Read, Write};

use crate::types::{encoding::*, status_codes::StatusCode};

/// The security to apply to messages on a secure channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MessageSecurityMode {
    Invalid = 0,
    None = 1,
    Sign = 2,
    SignAndEncrypt = 3,
}

impl BinaryEncoder<MessageSecurityMode> for MessageSecurityMode {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_i32(stream, *self as i32)
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        match read_i32(stream)? {
            0 => Ok(MessageSecurityMode::Invalid),
            1 => Ok(MessageSecurityMode::None),
            2 => Ok(MessageSecurityMode::Sign),
            3 => Ok(MessageSecurityMode::SignAndEncrypt),
            value => {
                error!("Invalid MessageSecurityMode value {}", value);
                Err(StatusCode::BadDecodingError)
            }
        }
    }
}

impl Default for MessageSecurityMode {
    fn default() -> Self {
        MessageSecurityMode::Invalid
    }
}

const MESSAGE_SECURITY_MODE_NONE: &str = "None";
const MESSAGE_SECURITY_MODE_SIGN: &str = "Sign";
const MESSAGE_SECURITY_MODE_SIGN_AND_ENCRYPT: &str = "SignAndEncrypt";

impl From<MessageSecurityMode> for String {
    fn from(security_mode: MessageSecurityMode) -> Self {
        String::from(match security_mode {
            MessageSecurityMode::None => MESSAGE_SECURITY_MODE_NONE,
            MessageSecurityMode::Sign => MESSAGE_SECURITY_MODE_SIGN,
            MessageSecurityMode::SignAndEncrypt => MESSAGE_SECURITY_MODE_SIGN_AND_ENCRYPT,
            _ => "",
        })
    }
}

impl<'a> From<&'a str> for MessageSecurityMode {
    fn from(str: &'a str) -> Self {
        match str {
            MESSAGE_SECURITY_MODE_NONE => MessageSecurityMode::None,
            MESSAGE_SECURITY_MODE_SIGN => MessageSecurityMode::Sign,
            MESSAGE_SECURITY_MODE_SIGN_AND_ENCRYPT => MessageSecurityMode::SignAndEncrypt,
            _ => {
                error!("Specified security mode \"{}\" is not recognized", str);
                MessageSecurityMode::Invalid
            }
        }
    }
}

/// Whether an OpenSecureChannel request issues a new token or renews an existing one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SecurityTokenRequestType {
    Issue = 0,
    Renew = 1,
}

impl BinaryEncoder<SecurityTokenRequestType> for SecurityTokenRequestType {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_i32(stream, *self as i32)
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        match read_i32(stream)? {
            0 => Ok(SecurityTokenRequestType::Issue),
            1 => Ok(SecurityTokenRequestType::Renew),
            value => {
                error!("Invalid SecurityTokenRequestType value {}", value);
                Err(StatusCode::BadDecodingError)
            }
        }
    }
}

/// The kind of application an endpoint description refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApplicationType {
    Server = 0,
    Client = 1,
    ClientAndServer = 2,
    DiscoveryServer = 3,
}

impl BinaryEncoder<ApplicationType> for ApplicationType {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_i32(stream, *self as i32)
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        match read_i32(stream)? {
            0 => Ok(ApplicationType::Server),
            1 => Ok(ApplicationType::Client),
            2 => Ok(ApplicationType::ClientAndServer),
            3 => Ok(ApplicationType::DiscoveryServer),
            value => {
                error!("Invalid ApplicationType value {}", value);
                Err(StatusCode::BadDecodingError)
            }
        }
    }
}

/// The kind of user identity token a token policy accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UserTokenType {
    Anonymous = 0,
    UserName = 1,
    Certificate = 2,
    IssuedToken = 3,
}

impl BinaryEncoder<UserTokenType> for UserTokenType {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_i32(stream, *self as i32)
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        match read_i32(stream)? {
            0 => Ok(UserTokenType::Anonymous),
            1 => Ok(UserTokenType::UserName),
            2 => Ok(UserTokenType::Certificate),
            3 => Ok(UserTokenType::IssuedToken),
            value => {
                error!("Invalid UserTokenType value {}", value);
                Err(StatusCode::BadDecodingError)
            }
        }
    }
}

/// Which timestamps to return on a read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimestampsToReturn {
    Source = 0,
    Server = 1,
    Both = 2,
    Neither = 3,
}

impl BinaryEncoder<TimestampsToReturn> for TimestampsToReturn {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_i32(stream, *self as i32)
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        match read_i32(stream)? {
            0 => Ok(TimestampsToReturn::Source),
            1 => Ok(TimestampsToReturn::Server),
            2 => Ok(TimestampsToReturn::Both),
            3 => Ok(TimestampsToReturn::Neither),
            value => {
                error!("Invalid TimestampsToReturn value {}", value);
                Err(StatusCode::BadDecodingError)
            }
        }
    }
}

/// Direction references are followed in a browse.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BrowseDirection {
    Forward = 0,
    Inverse = 1,
    Both = 2,
}

impl BinaryEncoder<BrowseDirection> for BrowseDirection {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_i32(stream, *self as i32)
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        match read_i32(stream)? {
            0 => Ok(BrowseDirection::Forward),
            1 => Ok(BrowseDirection::Inverse),
            2 => Ok(BrowseDirection::Both),
            value => {
                error!("Invalid BrowseDirection value {}", value);
                Err(StatusCode::BadDecodingError)
            }
        }
    }
}

/// The class of a node in the address space.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeClass {
    Unspecified = 0,
    Object = 1,
    Variable = 2,
    Method = 4,
    ObjectType = 8,
    VariableType = 16,
    ReferenceType = 32,
    DataType = 64,
    View = 128,
}

impl BinaryEncoder<NodeClass> for NodeClass {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_i32(stream, *self as i32)
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        match read_i32(stream)? {
            0 => Ok(NodeClass::Unspecified),
            1 => Ok(NodeClass::Object),
            2 => Ok(NodeClass::Variable),
            4 => Ok(NodeClass::Method),
            8 => Ok(NodeClass::ObjectType),
            16 => Ok(NodeClass::VariableType),
            32 => Ok(NodeClass::ReferenceType),
            64 => Ok(NodeClass::DataType),
            128 => Ok(NodeClass::View),
            value => {
                error!("Invalid NodeClass value {}", value);
                Err(StatusCode::BadDecodingError)
            }
        }
    }
}

// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The UACP / UASC wire layer - framed TCP types, the tokio codec, message
//! chunking and the secure channel record.

pub mod buffer;
pub mod chunker;
pub mod message_chunk;
pub mod message_chunk_info;
pub mod secure_channel;
pub mod security_header;
pub mod tcp_codec;
pub mod tcp_types;
pub mod url;

pub mod prelude {
    pub use super::buffer::SendBuffer;
    pub use super::chunker::Chunker;
    pub use super::message_chunk::{MessageChunk, MessageChunkType, MessageIsFinalType};
    pub use super::message_chunk_info::ChunkInfo;
    pub use super::secure_channel::SecureChannel;
    pub use super::security_header::{
        AsymmetricSecurityHeader, SecurityHeader, SequenceHeader, SymmetricSecurityHeader,
    };
    pub use super::tcp_codec::{Message, TcpCodec};
    pub use super::tcp_types::{
        AcknowledgeMessage, ErrorMessage, HelloMessage, MessageHeader, MessageType,
    };
    pub use super::url::*;
}

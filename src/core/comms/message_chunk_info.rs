// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Decoded header information for a message chunk, including where the
//! message body sits within the chunk data.

use std::io::Cursor;

use crate::core::comms::{
    message_chunk::{MessageChunk, MessageChunkHeader, MessageChunkType},
    secure_channel::SecureChannel,
    security_header::{
        AsymmetricSecurityHeader, SecurityHeader, SequenceHeader, SymmetricSecurityHeader,
    },
};
use crate::types::{encoding::*, StatusCode};

/// Chunk info provides the decoded headers of a chunk plus the offset and
/// length of the message body within it.
#[derive(Debug, Clone)]
pub struct ChunkInfo {
    /// The message header
    pub message_header: MessageChunkHeader,
    /// The security header
    pub security_header: SecurityHeader,
    /// The sequence header
    pub sequence_header: SequenceHeader,
    /// Byte offset of the message body within the chunk data
    pub body_offset: usize,
    /// Length of the message body
    pub body_length: usize,
}

impl ChunkInfo {
    pub fn new(chunk: &MessageChunk, secure_channel: &SecureChannel) -> Result<ChunkInfo, StatusCode> {
        let decoding_options = secure_channel.decoding_options();
        let mut stream = Cursor::new(&chunk.data);

        let message_header = MessageChunkHeader::decode(&mut stream, &decoding_options)?;

        let security_header = if message_header.message_type == MessageChunkType::OpenSecureChannel
        {
            let security_header =
                AsymmetricSecurityHeader::decode(&mut stream, &decoding_options)?;
            let security_policy_uri = security_header.security_policy_uri.as_ref();
            if !secure_channel.is_valid_security_policy_uri(security_policy_uri) {
                error!(
                    "Security policy of chunk \"{}\" does not match the channel's policy",
                    security_policy_uri
                );
                return Err(StatusCode::BadSecurityPolicyRejected);
            }
            SecurityHeader::Asymmetric(security_header)
        } else {
            SecurityHeader::Symmetric(SymmetricSecurityHeader::decode(
                &mut stream,
                &decoding_options,
            )?)
        };

        let sequence_header = SequenceHeader::decode(&mut stream, &decoding_options)?;

        // The body is everything past the headers
        let body_offset = stream.position() as usize;
        let message_size = message_header.message_size as usize;
        if message_size != chunk.data.len() {
            error!(
                "The message size {} is not the same as the supplied buffer {}",
                message_size,
                chunk.data.len()
            );
            return Err(StatusCode::BadDecodingError);
        }
        if body_offset > message_size {
            error!("Chunk headers overrun the message size");
            return Err(StatusCode::BadDecodingError);
        }
        let body_length = message_size - body_offset;

        Ok(ChunkInfo {
            message_header,
            security_header,
            sequence_header,
            body_offset,
            body_length,
        })
    }
}

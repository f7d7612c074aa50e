// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The codec is an implementation of a tokio Encoder/Decoder which can be used
//! to read data from the socket in terms of frames which in our case are any
//! of the following:
//!
//! * HEL - Hello message
//! * ACK - Acknowledge message
//! * ERR - Error message
//! * MSG - Message chunk
//! * OPN - Open Secure Channel message
//! * CLO - Close Secure Channel message

use std::io::{self, Cursor};

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::core::comms::message_chunk::MessageChunk;
use crate::core::comms::tcp_types::{
    AcknowledgeMessage, ErrorMessage, HelloMessage, MessageHeader, MessageType, MESSAGE_HEADER_LEN,
};
use crate::types::{encoding::*, DecodingOptions, StatusCode};

#[derive(Debug)]
pub enum Message {
    Hello(HelloMessage),
    Acknowledge(AcknowledgeMessage),
    Error(ErrorMessage),
    Chunk(MessageChunk),
}

/// Implements a tokio codec that allows incoming data to be transformed into
/// OPC UA message chunks with as little buffering as possible. The frame
/// boundaries the codec produces are exactly the chunk boundaries the peer
/// wrote - chunks are never coalesced, the layer above reassembles them.
pub struct TcpCodec {
    decoding_options: DecodingOptions,
}

impl Decoder for TcpCodec {
    type Item = Message;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Every message has at least an 8 byte header to be read to know what follows
        if buf.len() < MESSAGE_HEADER_LEN {
            return Ok(None);
        }

        // Get the message header
        let message_header = {
            let mut stream = Cursor::new(&buf[0..MESSAGE_HEADER_LEN]);
            MessageHeader::decode(&mut stream, &self.decoding_options)?
        };

        // Once we have the header we can infer the message size required to read the rest of
        // the message. The buffer needs to have at least that amount of bytes in it for the
        // whole message to be extracted.
        let message_size = message_header.message_size as usize;
        if message_size < MESSAGE_HEADER_LEN {
            error!("Message size {} is less than the header", message_size);
            return Err(io::Error::from(StatusCode::BadTcpMessageTypeInvalid));
        }
        if self.decoding_options.max_message_size > 0
            && message_size > self.decoding_options.max_message_size
        {
            error!(
                "Message size {} exceeds the negotiated limit {}",
                message_size, self.decoding_options.max_message_size
            );
            return Err(io::Error::from(StatusCode::BadTcpMessageTooLarge));
        }
        if buf.len() < message_size {
            // Not enough bytes
            return Ok(None);
        }

        // Extract the message bytes from the buffer & decode them into a message
        let mut buf = buf.split_to(message_size);
        let message = Self::decode_message(message_header, &mut buf, &self.decoding_options)
            .map_err(|e| {
                error!("Codec got an error {:?} while decoding a message", e);
                io::Error::from(e)
            })?;
        Ok(Some(message))
    }
}

impl Encoder<Message> for TcpCodec {
    type Error = io::Error;

    fn encode(&mut self, data: Message, buf: &mut BytesMut) -> Result<(), io::Error> {
        match data {
            Message::Hello(msg) => self.write(msg, buf),
            Message::Acknowledge(msg) => self.write(msg, buf),
            Message::Error(msg) => self.write(msg, buf),
            Message::Chunk(msg) => self.write(msg, buf),
        }
    }
}

impl TcpCodec {
    pub fn new(decoding_options: DecodingOptions) -> TcpCodec {
        TcpCodec { decoding_options }
    }

    // Writes the encodable thing into the buffer.
    fn write<T>(&self, msg: T, buf: &mut BytesMut) -> Result<(), io::Error>
    where
        T: BinaryEncoder<T> + std::fmt::Debug,
    {
        buf.reserve(msg.byte_len());
        msg.encode(&mut buf.writer()).map(|_| ()).map_err(|err| {
            error!("Error writing message {:?}, err = {}", msg, err);
            io::Error::from(err)
        })
    }

    /// Reads a message out of the buffer, which is assumed by now to be the proper length
    fn decode_message(
        message_header: MessageHeader,
        buf: &mut BytesMut,
        decoding_options: &DecodingOptions,
    ) -> Result<Message, StatusCode> {
        let mut stream = Cursor::new(&buf[..]);
        match message_header.message_type {
            MessageType::Acknowledge => Ok(Message::Acknowledge(AcknowledgeMessage::decode(
                &mut stream,
                decoding_options,
            )?)),
            MessageType::Hello => Ok(Message::Hello(HelloMessage::decode(
                &mut stream,
                decoding_options,
            )?)),
            MessageType::Error => Ok(Message::Error(ErrorMessage::decode(
                &mut stream,
                decoding_options,
            )?)),
            MessageType::Chunk => Ok(Message::Chunk(MessageChunk::decode(
                &mut stream,
                decoding_options,
            )?)),
            MessageType::Invalid => {
                error!("Message type for chunk is invalid.");
                Err(StatusCode::BadTcpMessageTypeInvalid)
            }
        }
    }
}

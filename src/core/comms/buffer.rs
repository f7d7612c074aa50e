// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The send buffer - stages outgoing messages as chunks and writes them to
//! the stream in a cancel safe way.

use std::{
    collections::VecDeque,
    io::{BufRead, Cursor},
};

use crate::core::comms::{
    chunker::{next_sequence_number, Chunker},
    message_chunk::MessageChunk,
    secure_channel::SecureChannel,
};
use crate::core::handle::Handle;
use crate::core::supported_message::SupportedMessage;
use crate::types::StatusCode;

#[derive(Copy, Clone, Debug)]
enum SendBufferState {
    Reading(usize),
    Writing,
}

pub struct SendBuffer {
    /// The send buffer
    buffer: Cursor<Vec<u8>>,
    /// Queued chunks
    chunks: VecDeque<MessageChunk>,
    /// The request id factory. Ids are contiguous, starting at the configured
    /// initial value.
    request_id: Handle,
    /// Last sent sequence number. Sequence numbers increase by one per chunk
    /// across the whole channel, wrapping at the point defined by the spec.
    last_sent_sequence_number: u32,
    /// Maximum size of a message, total. Use 0 for no limit
    pub max_message_size: usize,
    /// Maximum number of chunks in a message.
    pub max_chunk_count: usize,
    /// Maximum size of each individual chunk.
    pub send_buffer_size: usize,

    state: SendBufferState,
}

// The send buffer works as follows:
//  - `write` is called with a message that is turned into chunks.
//  - `encode_next_chunk` encodes one queued chunk into the internal buffer.
//  - `read_into_async` writes the buffer to the output, setting the state to
//    `Reading` until the buffer is exhausted, at which point the state is set
//    back to `Writing`.
//  - `write` cannot be called while we are writing to the output.
impl SendBuffer {
    pub fn new(
        initial_request_id: u32,
        buffer_size: usize,
        max_message_size: usize,
        max_chunk_count: usize,
    ) -> Self {
        Self {
            buffer: Cursor::new(vec![0u8; buffer_size + 1024]),
            chunks: VecDeque::with_capacity(max_chunk_count),
            request_id: Handle::new(initial_request_id),
            last_sent_sequence_number: 0,
            max_message_size,
            max_chunk_count,
            send_buffer_size: buffer_size,
            state: SendBufferState::Writing,
        }
    }

    pub fn encode_next_chunk(&mut self, secure_channel: &SecureChannel) -> Result<(), StatusCode> {
        if matches!(self.state, SendBufferState::Reading(_)) {
            return Err(StatusCode::BadInvalidState);
        }

        let Some(next_chunk) = self.chunks.pop_front() else {
            return Ok(());
        };

        trace!("Sending chunk {:?}", next_chunk);
        let size = secure_channel.apply_security(&next_chunk, self.buffer.get_mut())?;
        self.state = SendBufferState::Reading(size);

        Ok(())
    }

    pub fn write(
        &mut self,
        request_id: u32,
        message: SupportedMessage,
        secure_channel: &SecureChannel,
    ) -> Result<u32, StatusCode> {
        trace!("Writing request to buffer");

        // Turn message into chunks
        let chunks = Chunker::encode(
            next_sequence_number(self.last_sent_sequence_number),
            request_id,
            self.max_message_size,
            self.send_buffer_size,
            secure_channel,
            &message,
        )?;

        if self.max_chunk_count > 0 && chunks.len() > self.max_chunk_count {
            error!(
                "Cannot write message since {} chunks exceeds {} chunk limit",
                chunks.len(),
                self.max_chunk_count
            );
            Err(StatusCode::BadCommunicationError)
        } else {
            // Sequence number monotonically increases per chunk
            for _ in 0..chunks.len() {
                self.last_sent_sequence_number =
                    next_sequence_number(self.last_sent_sequence_number);
            }

            // Send chunks
            self.chunks.extend(chunks);
            Ok(request_id)
        }
    }

    pub fn next_request_id(&mut self) -> u32 {
        self.request_id.next()
    }

    pub fn last_sent_sequence_number(&self) -> u32 {
        self.last_sent_sequence_number
    }

    pub async fn read_into_async(
        &mut self,
        write: &mut (impl tokio::io::AsyncWrite + Unpin),
    ) -> Result<(), tokio::io::Error> {
        use tokio::io::AsyncWriteExt;

        // Set the state to reading, or get the current end point
        let end = match self.state {
            SendBufferState::Writing => {
                let end = self.buffer.position() as usize;
                self.state = SendBufferState::Reading(end);
                self.buffer.set_position(0);
                end
            }
            SendBufferState::Reading(end) => end,
        };

        let pos = self.buffer.position() as usize;
        let buf = &self.buffer.get_ref()[pos..end];
        // Write to the stream. The stream is not advanced until after the write
        // completes, so since `write` is cancellation safe, this method is
        // cancellation safe, which is essential to the transport poll loop.
        let written = write.write(buf).await?;

        self.buffer.consume(written);

        if end == self.buffer.position() as usize {
            self.state = SendBufferState::Writing;
            self.buffer.set_position(0);
        }

        Ok(())
    }

    pub fn should_encode_chunks(&self) -> bool {
        !self.chunks.is_empty() && !self.can_read()
    }

    pub fn can_read(&self) -> bool {
        matches!(self.state, SendBufferState::Reading(_)) || self.buffer.position() != 0
    }

    /// Revises the buffer limits downwards to the values negotiated in the
    /// acknowledge message.
    pub fn revise(
        &mut self,
        send_buffer_size: usize,
        max_message_size: usize,
        max_chunk_count: usize,
    ) {
        if send_buffer_size > 0 && self.send_buffer_size > send_buffer_size {
            self.buffer.get_mut().shrink_to(send_buffer_size + 1024);
            self.send_buffer_size = send_buffer_size;
        }
        if max_message_size > 0 && self.max_message_size > max_message_size {
            self.max_message_size = max_message_size;
        }
        if max_chunk_count > 0 && self.max_chunk_count > max_chunk_count {
            self.max_chunk_count = max_chunk_count;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::SendBuffer;

    use crate::core::comms::secure_channel::{Role, SecureChannel};
    use crate::types::{
        DateTime, DecodingOptions, NodeId, ReadRequest, ReadValueId, RequestHeader, StatusCode,
        TimestampsToReturn,
    };

    fn get_buffer_and_channel() -> (SendBuffer, SecureChannel) {
        let buffer = SendBuffer::new(1, 8196, 81960, 5);
        let channel = SecureChannel::new(Role::Client, DecodingOptions::test());
        (buffer, channel)
    }

    fn read_request(node_count: u32) -> ReadRequest {
        ReadRequest {
            request_header: RequestHeader::new(&NodeId::null(), &DateTime::null(), 101),
            max_age: 0.0,
            timestamps_to_return: TimestampsToReturn::Both,
            nodes_to_read: Some(
                (0..node_count)
                    .map(|r| ReadValueId::from(NodeId::new(1, r)))
                    .collect(),
            ),
        }
    }

    #[tokio::test]
    async fn buffer_simple() {
        // Write a small message to the buffer
        let (mut buffer, channel) = get_buffer_and_channel();

        let request_id = buffer.write(1, read_request(1).into(), &channel).unwrap();
        assert_eq!(request_id, 1);

        assert!(buffer.should_encode_chunks());
        buffer.encode_next_chunk(&channel).unwrap();
        assert!(buffer.can_read());

        let mut cursor = Cursor::new(Vec::new());
        buffer.read_into_async(&mut cursor).await.unwrap();
        assert!(cursor.get_ref().len() > 50);
        assert_eq!(buffer.last_sent_sequence_number(), 1);
    }

    #[tokio::test]
    async fn buffer_chunking() {
        // Write a large enough message that it is split into chunks.
        let (mut buffer, channel) = get_buffer_and_channel();

        let request_id = buffer.write(1, read_request(1000).into(), &channel).unwrap();
        assert_eq!(request_id, 1);

        assert_eq!(buffer.chunks.len(), 3);
        let mut cursor = Cursor::new(Vec::new());

        for _ in 0..3 {
            assert!(buffer.should_encode_chunks());
            buffer.encode_next_chunk(&channel).unwrap();
            assert!(!buffer.should_encode_chunks());
            assert!(buffer.can_read());

            buffer.read_into_async(&mut cursor).await.unwrap();
        }
        assert!(!buffer.should_encode_chunks());
        assert!(!buffer.can_read());
        assert!(cursor.get_ref().len() > 8196 * 2 && cursor.get_ref().len() < 8196 * 3);
        // One sequence number per chunk
        assert_eq!(buffer.last_sent_sequence_number(), 3);
    }

    #[test]
    fn buffer_too_large_message() {
        // Write a very large message exceeding the max message size.
        let (mut buffer, channel) = get_buffer_and_channel();

        let err = buffer
            .write(1, read_request(10000).into(), &channel)
            .unwrap_err();
        assert_eq!(err, StatusCode::BadRequestTooLarge);
    }

    #[test]
    fn buffer_too_many_chunks() {
        // Write a large enough message that we exceed the maximum chunk count.
        let (mut buffer, channel) = get_buffer_and_channel();

        let err = buffer
            .write(1, read_request(4000).into(), &channel)
            .unwrap_err();
        assert_eq!(err, StatusCode::BadCommunicationError);
    }

    #[tokio::test]
    async fn buffer_read_partial() {
        // Write a large message to the buffer.
        let (mut buffer, channel) = get_buffer_and_channel();

        let request_id = buffer.write(1, read_request(1000).into(), &channel).unwrap();
        assert_eq!(request_id, 1);

        assert_eq!(buffer.chunks.len(), 3);
        // Use a fixed size buffer exactly half the chunk size. This simulates a TCP connection
        // writing data in smaller pieces than the configured chunk size.
        let mut buf = [0u8; 4098];
        // Cursor<&mut [u8; N]> doesn't support AsyncWrite, but Cursor<&mut [u8]> does.
        let mut cursor = Cursor::new(&mut buf as &mut [u8]);

        for _ in 0..2 {
            assert!(buffer.should_encode_chunks());
            buffer.encode_next_chunk(&channel).unwrap();
            assert!(!buffer.should_encode_chunks());
            assert!(buffer.can_read());

            buffer.read_into_async(&mut cursor).await.unwrap();
            assert!(buffer.can_read());
            assert_eq!(cursor.position(), 4098);
            cursor.set_position(0);
            buffer.read_into_async(&mut cursor).await.unwrap();
            assert!(!buffer.can_read());
            cursor.set_position(0);
        }
        assert!(buffer.should_encode_chunks());
        buffer.encode_next_chunk(&channel).unwrap();
        assert!(buffer.can_read());
        buffer.read_into_async(&mut cursor).await.unwrap();
        assert!(cursor.position() < 4098);

        assert!(!buffer.should_encode_chunks());
        assert!(!buffer.can_read());
    }

    #[test]
    fn request_ids_are_contiguous_from_seed() {
        let (mut buffer, _) = get_buffer_and_channel();
        assert_eq!(buffer.next_request_id(), 1);
        assert_eq!(buffer.next_request_id(), 2);
        assert_eq!(buffer.next_request_id(), 3);

        let mut buffer = SendBuffer::new(1000, 8196, 81960, 5);
        assert_eq!(buffer.next_request_id(), 1000);
        assert_eq!(buffer.next_request_id(), 1001);
    }

    #[test]
    fn revise_only_shrinks() {
        let (mut buffer, _) = get_buffer_and_channel();
        buffer.revise(16384, 100_000, 10);
        assert_eq!(buffer.send_buffer_size, 8196);
        assert_eq!(buffer.max_message_size, 81960);
        assert_eq!(buffer.max_chunk_count, 5);

        buffer.revise(8192, 65536, 4);
        assert_eq!(buffer.send_buffer_size, 8192);
        assert_eq!(buffer.max_message_size, 65536);
        assert_eq!(buffer.max_chunk_count, 4);
    }
}

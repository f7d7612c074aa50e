// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The transport state - the table of in-flight requests and the chunk
//! accumulation and dispatch logic of the receive side.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::Either;
use parking_lot::RwLock;

use crate::core::comms::buffer::SendBuffer;
use crate::core::comms::chunker::{next_sequence_number, Chunker};
use crate::core::comms::message_chunk::{MessageChunk, MessageIsFinalType};
use crate::core::comms::message_chunk_info::ChunkInfo;
use crate::core::comms::secure_channel::SecureChannel;
use crate::core::comms::tcp_codec::Message;
use crate::core::supported_message::SupportedMessage;
use crate::types::StatusCode;

#[derive(Debug)]
struct MessageChunkWithChunkInfo {
    header: ChunkInfo,
    data_with_header: Vec<u8>,
}

/// The record parked for each in-flight request - the completion callback, the
/// chunks accumulated so far and the deadline after which the request fails
/// with `BadTimeout`.
pub(crate) struct MessageState {
    callback: tokio::sync::oneshot::Sender<Result<SupportedMessage, StatusCode>>,
    chunks: Vec<MessageChunkWithChunkInfo>,
    deadline: Instant,
}

pub(super) struct TransportState {
    /// Channel for outgoing requests. Only polled when the number of inflight requests is below the limit.
    outgoing_recv: tokio::sync::mpsc::Receiver<OutgoingMessage>,
    /// State of pending requests, keyed by request id. Keys are issued by the
    /// send buffer and strictly increase, so they are unique per request.
    message_states: HashMap<u32, MessageState>,
    /// Maximum number of inflight requests.
    max_inflight: usize,
    /// Secure channel
    pub(super) secure_channel: Arc<RwLock<SecureChannel>>,
    /// Max chunks accumulated for any single incoming message
    max_pending_incoming: usize,
    /// Last decoded sequence number
    last_received_sequence_number: u32,
}

#[derive(Debug)]
pub enum TransportPollResult {
    OutgoingMessage,
    OutgoingMessageSent,
    IncomingMessage,
    RenewedSecureChannel,
    Closed(StatusCode),
}

pub(crate) struct OutgoingMessage {
    pub request: SupportedMessage,
    pub callback: Option<tokio::sync::oneshot::Sender<Result<SupportedMessage, StatusCode>>>,
    pub deadline: Instant,
}

impl TransportState {
    pub fn new(
        secure_channel: Arc<RwLock<SecureChannel>>,
        outgoing_recv: tokio::sync::mpsc::Receiver<OutgoingMessage>,
        max_pending_incoming: usize,
        max_inflight: usize,
    ) -> Self {
        Self {
            secure_channel,
            outgoing_recv,
            message_states: HashMap::new(),
            max_inflight,
            max_pending_incoming,
            last_received_sequence_number: 0,
        }
    }

    /// Wait for an outgoing message. Also sweeps the pending table for
    /// messages that have passed their deadline - those are removed and
    /// completed with `BadTimeout`, so any response arriving later for them
    /// is silently discarded.
    pub async fn wait_for_outgoing_message(
        &mut self,
        send_buffer: &mut SendBuffer,
    ) -> Option<(SupportedMessage, u32)> {
        loop {
            // Check for any messages that have timed out, and get the time until the next message
            // times out
            let timeout_fut = match self.next_timeout() {
                Some(t) => Either::Left(tokio::time::sleep_until(t.into())),
                None => Either::Right(futures::future::pending::<()>()),
            };

            // Only listen for outgoing messages if the number of inflight messages is below the limit.
            if self.max_inflight > self.message_states.len() {
                tokio::select! {
                    _ = timeout_fut => {
                        continue;
                    }
                    outgoing = self.outgoing_recv.recv() => {
                        let outgoing = outgoing?;
                        let request_id = send_buffer.next_request_id();
                        if let Some(callback) = outgoing.callback {
                            self.message_states.insert(request_id, MessageState {
                                callback,
                                chunks: Vec::new(),
                                deadline: outgoing.deadline,
                            });
                        }
                        break Some((outgoing.request, request_id));
                    }
                }
            } else {
                timeout_fut.await;
            }
        }
    }

    /// Store incoming messages in the message state. Anything other than a
    /// chunk at this point means the channel is broken.
    pub fn handle_incoming_message(&mut self, message: Message) -> Result<(), StatusCode> {
        match message {
            Message::Chunk(chunk) => self.process_chunk(chunk),
            Message::Error(error) => {
                let status = StatusCode::from_u32(error.error)
                    .unwrap_or(StatusCode::BadUnexpectedError);
                error!(
                    "Expecting a chunk, got an error message {}, reason \"{}\"",
                    status,
                    error.reason.as_ref()
                );
                Err(status)
            }
            m => {
                error!("Expected a chunk message, got {:?}", m);
                Err(StatusCode::BadUnexpectedError)
            }
        }
    }

    fn next_timeout(&mut self) -> Option<Instant> {
        let now = Instant::now();
        let mut next_timeout = None;
        let mut timed_out = Vec::new();
        for (id, state) in &self.message_states {
            if state.deadline <= now {
                timed_out.push(*id);
            } else {
                match &next_timeout {
                    Some(t) if *t > state.deadline => next_timeout = Some(state.deadline),
                    None => next_timeout = Some(state.deadline),
                    _ => {}
                }
            }
        }
        for id in timed_out {
            if let Some(state) = self.message_states.remove(&id) {
                debug!("Request {} timed out", id);
                let _ = state.callback.send(Err(StatusCode::BadTimeout));
            }
        }
        next_timeout
    }

    fn process_chunk(&mut self, chunk: MessageChunk) -> Result<(), StatusCode> {
        let chunk = {
            let mut secure_channel = trace_write_lock!(self.secure_channel);
            secure_channel.verify_and_remove_security(&chunk.data)?
        };

        let (chunk_info, secure_channel_id) = {
            let secure_channel = trace_read_lock!(self.secure_channel);
            (
                chunk.chunk_info(&secure_channel)?,
                secure_channel.secure_channel_id(),
            )
        };

        // Sequence numbers are numbered across every chunk on the channel, so
        // continuity is validated here, before the chunk is matched to a
        // request. A chunk belonging to a dropped response still consumes its
        // sequence number. A gap is fatal to the channel.
        let sequence_number = chunk_info.sequence_header.sequence_number;
        let expected_sequence_number = next_sequence_number(self.last_received_sequence_number);
        if sequence_number != expected_sequence_number {
            error!(
                "Received sequence number {} but expected {}",
                sequence_number, expected_sequence_number
            );
            return Err(StatusCode::BadSequenceNumberInvalid);
        }
        self.last_received_sequence_number = sequence_number;

        // The channel id must be the one assigned at open
        if secure_channel_id != 0
            && chunk_info.message_header.secure_channel_id != secure_channel_id
        {
            error!(
                "Received secure channel id {} but expected {}",
                chunk_info.message_header.secure_channel_id, secure_channel_id
            );
            return Err(StatusCode::BadSecureChannelIdInvalid);
        }

        let req_id = chunk_info.sequence_header.request_id;

        // Responses without a corresponding request are logged and dropped.
        // Servers may emit responses for requests this client never made,
        // e.g. publish responses, which are not the transport's problem.
        let Some(message_state) = self.message_states.get_mut(&req_id) else {
            debug!("Response for request id {} has no pending request and will be dropped", req_id);
            return Ok(());
        };

        match chunk_info.message_header.is_final {
            MessageIsFinalType::Intermediate => {
                trace!(
                    "receive chunk intermediate {}:{}",
                    chunk_info.sequence_header.request_id,
                    chunk_info.sequence_header.sequence_number
                );
                message_state.chunks.push(MessageChunkWithChunkInfo {
                    header: chunk_info,
                    data_with_header: chunk.data,
                });
                let chunks_len = message_state.chunks.len();
                if self.max_pending_incoming > 0 && chunks_len > self.max_pending_incoming {
                    error!(
                        "too many pending incoming chunks {} > {}",
                        chunks_len, self.max_pending_incoming
                    );
                    let message_state = self.message_states.remove(&req_id).unwrap();
                    let _ = message_state
                        .callback
                        .send(Err(StatusCode::BadEncodingLimitsExceeded));
                }
            }
            MessageIsFinalType::FinalError => {
                // The peer aborted the message. The accumulation is discarded
                // and the pending request told, but the channel stays usable.
                info!("Discarding chunks of an aborted message");
                let message_state = self.message_states.remove(&req_id).unwrap();
                let _ = message_state
                    .callback
                    .send(Err(StatusCode::BadCommunicationError));
            }
            MessageIsFinalType::Final => {
                message_state.chunks.push(MessageChunkWithChunkInfo {
                    header: chunk_info,
                    data_with_header: chunk.data,
                });
                let message_state = self.message_states.remove(&req_id).unwrap();
                let first_sequence_number = message_state.chunks[0]
                    .header
                    .sequence_header
                    .sequence_number;
                let in_chunks: Vec<_> = message_state
                    .chunks
                    .into_iter()
                    .map(|c| MessageChunk {
                        data: c.data_with_header,
                    })
                    .collect();
                // A malformed message is fatal to the whole channel, so the
                // error propagates rather than just failing this one request.
                let message =
                    self.turn_received_chunks_into_message(first_sequence_number, &in_chunks)?;

                let _ = message_state.callback.send(Ok(message));
            }
        }
        Ok(())
    }

    fn turn_received_chunks_into_message(
        &mut self,
        first_sequence_number: u32,
        chunks: &[MessageChunk],
    ) -> Result<SupportedMessage, StatusCode> {
        // Chunk continuity across the channel was validated on receipt; this
        // checks the invariants within the message - one request id, one
        // channel id, contiguous sequence numbers - and decodes it.
        let secure_channel = trace_read_lock!(self.secure_channel);
        Chunker::validate_chunks(first_sequence_number, &secure_channel, chunks)?;
        Chunker::decode(chunks, &secure_channel, None)
    }

    /// Close the transport, aborting any pending requests.
    /// If `status` is good, the pending requests will be terminated with
    /// `BadConnectionClosed`.
    pub async fn close(&mut self, status: StatusCode) -> StatusCode {
        // If the status is good, we still want to send a bad status code
        // to the pending requests. They didn't succeed, after all.
        let request_status = if status.is_good() {
            StatusCode::BadConnectionClosed
        } else {
            status
        };

        for (_, pending) in self.message_states.drain() {
            let _ = pending.callback.send(Err(request_status));
        }

        // Make sure we also send a bad status for any remaining messages in the queue.
        // Close the channel first.
        self.outgoing_recv.close();

        // recv is no longer blocking.
        while let Some(msg) = self.outgoing_recv.recv().await {
            if let Some(cb) = msg.callback {
                let _ = cb.send(Err(request_status));
            }
        }

        status
    }
}

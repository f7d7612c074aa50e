// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Tests of message chunking - encode to chunks, reassembly, sequence number
//! validation and the wrap point.

use crate::core::comms::chunker::{next_sequence_number, Chunker};
use crate::core::comms::message_chunk::{
    MessageChunk, MessageChunkType, MessageIsFinalType, MESSAGE_CHUNK_HEADER_SIZE,
};
use crate::core::comms::secure_channel::{Role, SecureChannel};
use crate::core::constants::SEQUENCE_NUMBER_WRAP;
use crate::core::supported_message::SupportedMessage;
use crate::types::*;

use super::*;

#[test]
fn chunk_round_trip_one_chunk() {
    init_logging();
    let secure_channel = make_open_secure_channel(1, 2);
    let request = make_sample_request(999);

    let chunks = Chunker::encode(1, 1, 0, 0, &secure_channel, &request).unwrap();
    assert_eq!(chunks.len(), 1);

    let chunk_info = chunks[0].chunk_info(&secure_channel).unwrap();
    assert_eq!(chunk_info.sequence_header.sequence_number, 1);
    assert_eq!(chunk_info.sequence_header.request_id, 1);
    assert_eq!(chunk_info.message_header.secure_channel_id, 1);
    assert_eq!(chunk_info.message_header.is_final, MessageIsFinalType::Final);

    let last_sequence_number = Chunker::validate_chunks(1, &secure_channel, &chunks).unwrap();
    assert_eq!(last_sequence_number, 1);

    let decoded = Chunker::decode(&chunks, &secure_channel, None).unwrap();
    assert_eq!(decoded, request);
    assert_eq!(decoded.request_handle(), 999);
}

#[test]
fn chunk_round_trip_multiple_chunks() {
    init_logging();
    let secure_channel = make_open_secure_channel(1, 2);
    let request = make_large_request(1000, 1500);

    // Encode against the minimum chunk size so the message is split
    let chunks = Chunker::encode(1, 7, 0, 8192, &secure_channel, &request).unwrap();
    assert!(chunks.len() > 1);

    // Intermediate chunks followed by a final chunk, all on request id 7
    for (i, chunk) in chunks.iter().enumerate() {
        let chunk_info = chunk.chunk_info(&secure_channel).unwrap();
        let expected_is_final = if i == chunks.len() - 1 {
            MessageIsFinalType::Final
        } else {
            MessageIsFinalType::Intermediate
        };
        assert_eq!(chunk_info.message_header.is_final, expected_is_final);
        assert_eq!(chunk_info.sequence_header.sequence_number, 1 + i as u32);
        assert_eq!(chunk_info.sequence_header.request_id, 7);
    }

    let last_sequence_number = Chunker::validate_chunks(1, &secure_channel, &chunks).unwrap();
    assert_eq!(last_sequence_number, chunks.len() as u32);

    let decoded = Chunker::decode(&chunks, &secure_channel, None).unwrap();
    assert_eq!(decoded, request);
}

#[test]
fn chunk_sequence_gap_is_an_error() {
    init_logging();
    let secure_channel = make_open_secure_channel(1, 2);
    let request = make_large_request(1000, 1500);

    let mut chunks = Chunker::encode(1, 7, 0, 8192, &secure_channel, &request).unwrap();
    assert!(chunks.len() > 2);

    // Drop a middle chunk and expect validation to fail
    chunks.remove(1);
    assert_eq!(
        Chunker::validate_chunks(1, &secure_channel, &chunks).unwrap_err(),
        StatusCode::BadSequenceNumberInvalid
    );
}

#[test]
fn chunk_wrong_request_id_is_an_error() {
    init_logging();
    let secure_channel = make_open_secure_channel(1, 2);

    let chunks_a = Chunker::encode(1, 7, 0, 8192, &secure_channel, &make_large_request(1, 1500))
        .unwrap();
    let chunks_b = Chunker::encode(2, 8, 0, 8192, &secure_channel, &make_large_request(2, 1500))
        .unwrap();

    // Mix chunks of two different requests. The second chunk carries the right
    // sequence number but the wrong request id.
    let mixed = vec![chunks_a[0].clone(), chunks_b[0].clone()];
    assert_eq!(
        Chunker::validate_chunks(1, &secure_channel, &mixed).unwrap_err(),
        StatusCode::BadSequenceNumberInvalid
    );
}

#[test]
fn chunk_wrong_channel_id_is_an_error() {
    init_logging();
    let secure_channel = make_open_secure_channel(1, 2);
    let request = make_sample_request(1);
    let chunks = Chunker::encode(1, 1, 0, 0, &secure_channel, &request).unwrap();

    // Validate against a channel with a different id
    let other_channel = make_open_secure_channel(99, 2);
    assert_eq!(
        Chunker::validate_chunks(1, &other_channel, &chunks).unwrap_err(),
        StatusCode::BadSecureChannelIdInvalid
    );
}

#[test]
fn sequence_number_wraps() {
    // Sequence numbers wrap at 2^32 - 1024 back to 1
    assert_eq!(next_sequence_number(1), 2);
    assert_eq!(next_sequence_number(SEQUENCE_NUMBER_WRAP - 1), SEQUENCE_NUMBER_WRAP);
    assert_eq!(next_sequence_number(SEQUENCE_NUMBER_WRAP), 1);
}

#[test]
fn chunk_sequence_numbers_across_wrap() {
    init_logging();
    let secure_channel = make_open_secure_channel(1, 2);
    let request = make_large_request(1000, 1500);

    // Start encoding just below the wrap point
    let start = SEQUENCE_NUMBER_WRAP - 1;
    let chunks = Chunker::encode(start, 7, 0, 8192, &secure_channel, &request).unwrap();
    assert!(chunks.len() >= 3);

    let chunk_info = chunks[0].chunk_info(&secure_channel).unwrap();
    assert_eq!(chunk_info.sequence_header.sequence_number, start);
    let chunk_info = chunks[1].chunk_info(&secure_channel).unwrap();
    assert_eq!(chunk_info.sequence_header.sequence_number, SEQUENCE_NUMBER_WRAP);
    let chunk_info = chunks[2].chunk_info(&secure_channel).unwrap();
    assert_eq!(chunk_info.sequence_header.sequence_number, 1);

    // Validation tolerates the wrap too
    let last_sequence_number =
        Chunker::validate_chunks(start, &secure_channel, &chunks).unwrap();
    assert_eq!(last_sequence_number, chunks.len() as u32 - 2);
}

#[test]
fn chunk_message_size_limit() {
    init_logging();
    let secure_channel = make_open_secure_channel(1, 2);
    let request = make_large_request(1000, 1500);

    // A max message size smaller than the message fails with BadRequestTooLarge
    // on the client role
    assert_eq!(
        Chunker::encode(1, 1, 1000, 0, &secure_channel, &request).unwrap_err(),
        StatusCode::BadRequestTooLarge
    );
}

#[test]
fn open_secure_channel_chunk_uses_asymmetric_header() {
    init_logging();
    let secure_channel = SecureChannel::new(Role::Client, DecodingOptions::test());
    let request: SupportedMessage = OpenSecureChannelRequest {
        request_header: RequestHeader::new(&NodeId::null(), &DateTime::now(), 1),
        client_protocol_version: 0,
        request_type: SecurityTokenRequestType::Issue,
        security_mode: MessageSecurityMode::None,
        client_nonce: ByteString::from(&[0u8; 32]),
        requested_lifetime: 3_600_000,
    }
    .into();

    let chunks = Chunker::encode(1, 1, 0, 0, &secure_channel, &request).unwrap();
    assert_eq!(chunks.len(), 1);

    let message_header = chunks[0]
        .message_header(&secure_channel.decoding_options())
        .unwrap();
    assert_eq!(
        message_header.message_type,
        MessageChunkType::OpenSecureChannel
    );
    // An open secure channel chunk before open has channel id 0
    assert_eq!(message_header.secure_channel_id, 0);

    let decoded = Chunker::decode(&chunks, &secure_channel, None).unwrap();
    assert_eq!(decoded, request);
}

#[test]
fn chunk_decode_round_trips_the_wire_format() {
    init_logging();
    let secure_channel = make_open_secure_channel(1, 2);
    let request = make_sample_request(42);
    let chunks = Chunker::encode(1, 1, 0, 0, &secure_channel, &request).unwrap();

    // Serialize the chunk and read it back through the chunk decoder
    let chunk_bytes = chunks[0].encode_to_vec();
    let mut stream = std::io::Cursor::new(chunk_bytes);
    let chunk = MessageChunk::decode(&mut stream, &secure_channel.decoding_options()).unwrap();
    assert_eq!(chunk, chunks[0]);
    assert!(chunk.data.len() > MESSAGE_CHUNK_HEADER_SIZE);
}

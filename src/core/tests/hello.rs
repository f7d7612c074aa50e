// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Tests of the UACP handshake types and the tcp codec framing.

use std::io::Cursor;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::core::comms::tcp_codec::{Message, TcpCodec};
use crate::core::comms::tcp_types::{
    AcknowledgeMessage, ErrorMessage, HelloMessage, MessageHeader, MessageType,
};
use crate::types::*;

use super::init_logging;

#[test]
fn hello_message_sizes() {
    let hello = HelloMessage::new("opc.tcp://localhost:4840/", 65536, 65536, 327675, 5);
    // The message header carries the total message size
    assert_eq!(hello.message_header.message_size as usize, hello.byte_len());
    assert_eq!(hello.protocol_version, 0);
}

#[test]
fn hello_round_trip() {
    let hello = HelloMessage::new("opc.tcp://localhost:4840/", 65536, 65536, 327675, 5);
    let buf = hello.encode_to_vec();
    let mut stream = Cursor::new(buf);
    let hello2 = HelloMessage::decode(&mut stream, &DecodingOptions::test()).unwrap();
    assert_eq!(hello, hello2);
}

#[test]
fn valid_buffer_sizes() {
    // Test that invalid buffer sizes are rejected, while valid buffer sizes are accepted
    let mut h = HelloMessage::new("opc.tcp://foo/", 0, 0, 0, 0);
    assert!(!h.is_valid_buffer_sizes());
    h.receive_buffer_size = 8191;
    assert!(!h.is_valid_buffer_sizes());
    h.send_buffer_size = 8191;
    assert!(!h.is_valid_buffer_sizes());
    h.receive_buffer_size = 8192;
    assert!(!h.is_valid_buffer_sizes());
    h.send_buffer_size = 8192;
    assert!(h.is_valid_buffer_sizes());
}

#[test]
fn endpoint_url_length() {
    // Ensure hello with URL > 4096 chars is invalid
    let mut h = HelloMessage::new("opc.tcp://foo/", 8192, 8192, 0, 0);
    assert!(h.is_endpoint_valid_length());
    h.endpoint_url = UAString::from((0..4097).map(|_| 'A').collect::<String>());
    assert!(!h.is_endpoint_valid_length());
    h.endpoint_url = UAString::from((0..4096).map(|_| 'A').collect::<String>());
    assert!(h.is_endpoint_valid_length());
}

#[test]
fn message_header_types() {
    assert_eq!(MessageHeader::message_type(b"HELF"), MessageType::Hello);
    assert_eq!(
        MessageHeader::message_type(b"ACKF"),
        MessageType::Acknowledge
    );
    assert_eq!(MessageHeader::message_type(b"ERRF"), MessageType::Error);
    assert_eq!(MessageHeader::message_type(b"MSGF"), MessageType::Chunk);
    assert_eq!(MessageHeader::message_type(b"MSGC"), MessageType::Chunk);
    assert_eq!(MessageHeader::message_type(b"MSGA"), MessageType::Chunk);
    assert_eq!(MessageHeader::message_type(b"OPNF"), MessageType::Chunk);
    assert_eq!(MessageHeader::message_type(b"CLOF"), MessageType::Chunk);
    // Hello with a chunk continuation byte is nonsense
    assert_eq!(MessageHeader::message_type(b"HELC"), MessageType::Invalid);
    assert_eq!(MessageHeader::message_type(b"XXXX"), MessageType::Invalid);
}

#[test]
fn error_message_from_status_code() {
    let error = ErrorMessage::from_status_code(StatusCode::BadTcpMessageTooLarge);
    assert_eq!(error.error, StatusCode::BadTcpMessageTooLarge.bits());
    assert_eq!(error.message_header.message_size as usize, error.byte_len());

    let buf = error.encode_to_vec();
    let mut stream = Cursor::new(buf);
    let error2 = ErrorMessage::decode(&mut stream, &DecodingOptions::test()).unwrap();
    assert_eq!(error, error2);
}

#[test]
fn codec_decodes_ack() {
    init_logging();
    let mut ack = AcknowledgeMessage {
        message_header: MessageHeader::new(MessageType::Acknowledge),
        protocol_version: 0,
        receive_buffer_size: 65536,
        send_buffer_size: 65536,
        max_message_size: 327675,
        max_chunk_count: 5,
    };
    ack.message_header.message_size = ack.byte_len() as u32;

    let mut codec = TcpCodec::new(DecodingOptions::test());
    let mut buf = BytesMut::from(&ack.encode_to_vec()[..]);
    match codec.decode(&mut buf).unwrap() {
        Some(Message::Acknowledge(ack2)) => assert_eq!(ack, ack2),
        other => panic!("Expected an ack, got {:?}", other),
    }
    assert!(buf.is_empty());
}

#[test]
fn codec_waits_for_whole_message() {
    init_logging();
    let hello = HelloMessage::new("opc.tcp://localhost:4840/", 65536, 65536, 327675, 5);
    let bytes = hello.encode_to_vec();

    let mut codec = TcpCodec::new(DecodingOptions::test());

    // Half a message is not enough to produce a frame
    let mut buf = BytesMut::from(&bytes[..bytes.len() / 2]);
    assert!(codec.decode(&mut buf).unwrap().is_none());

    // The rest of it is
    buf.extend_from_slice(&bytes[bytes.len() / 2..]);
    match codec.decode(&mut buf).unwrap() {
        Some(Message::Hello(hello2)) => assert_eq!(hello, hello2),
        other => panic!("Expected a hello, got {:?}", other),
    }
}

#[test]
fn codec_does_not_coalesce_chunks() {
    init_logging();
    let secure_channel = super::make_open_secure_channel(1, 2);
    let request = super::make_large_request(1, 1500);
    let chunks = crate::core::comms::chunker::Chunker::encode(
        1,
        1,
        0,
        8192,
        &secure_channel,
        &request,
    )
    .unwrap();
    assert!(chunks.len() > 1);

    // Write all the chunks into one buffer, the codec must produce one frame
    // per chunk in order
    let mut buf = BytesMut::new();
    for chunk in &chunks {
        buf.extend_from_slice(&chunk.encode_to_vec());
    }

    let mut codec = TcpCodec::new(DecodingOptions::test());
    for expected in &chunks {
        match codec.decode(&mut buf).unwrap() {
            Some(Message::Chunk(chunk)) => assert_eq!(&chunk, expected),
            other => panic!("Expected a chunk, got {:?}", other),
        }
    }
    assert!(buf.is_empty());
}

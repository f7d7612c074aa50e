// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Tests of the secure channel record - token bookkeeping, renewal and the
//! security checks applied to inbound chunks.

use crate::core::comms::chunker::Chunker;
use crate::core::comms::secure_channel::{Role, SecureChannel, SecurityPolicy};
use crate::core::supported_message::SupportedMessage;
use crate::types::*;

use super::*;

fn security_token(channel_id: u32, token_id: u32, revised_lifetime: u32) -> ChannelSecurityToken {
    ChannelSecurityToken {
        channel_id,
        token_id,
        created_at: DateTime::now(),
        revised_lifetime,
    }
}

#[test]
fn security_policy_uris() {
    assert_eq!(
        SecurityPolicy::from_uri("http://opcfoundation.org/UA/SecurityPolicy#None"),
        SecurityPolicy::None
    );
    assert_eq!(
        SecurityPolicy::from_uri("http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256"),
        SecurityPolicy::Unknown
    );
    assert_eq!(
        SecurityPolicy::None.to_uri(),
        "http://opcfoundation.org/UA/SecurityPolicy#None"
    );
}

#[test]
fn signing_modes_are_rejected() {
    let mut secure_channel = SecureChannel::new(Role::Client, DecodingOptions::test());
    assert!(secure_channel
        .set_security_mode(MessageSecurityMode::None)
        .is_ok());
    assert_eq!(
        secure_channel
            .set_security_mode(MessageSecurityMode::Sign)
            .unwrap_err(),
        StatusCode::BadSecurityModeRejected
    );
    assert_eq!(
        secure_channel
            .set_security_mode(MessageSecurityMode::SignAndEncrypt)
            .unwrap_err(),
        StatusCode::BadSecurityModeRejected
    );
}

#[test]
fn token_rotation_keeps_previous_token() {
    let mut secure_channel = SecureChannel::new(Role::Client, DecodingOptions::test());
    assert_eq!(secure_channel.token_id(), 0);

    // Issue
    secure_channel.set_security_token(security_token(5, 100, 3_600_000));
    assert_eq!(secure_channel.secure_channel_id(), 5);
    assert_eq!(secure_channel.token_id(), 100);
    assert_eq!(secure_channel.previous_token_id(), None);
    assert!(secure_channel.is_valid_token_id(100));
    assert!(!secure_channel.is_valid_token_id(99));

    // Renew - the old token remains acceptable
    secure_channel.set_security_token(security_token(5, 101, 3_600_000));
    assert_eq!(secure_channel.token_id(), 101);
    assert_eq!(secure_channel.previous_token_id(), Some(100));
    assert!(secure_channel.is_valid_token_id(101));
    assert!(secure_channel.is_valid_token_id(100));
    assert!(!secure_channel.is_valid_token_id(99));

    // Another renew drops the oldest token
    secure_channel.set_security_token(security_token(5, 102, 3_600_000));
    assert!(secure_channel.is_valid_token_id(102));
    assert!(secure_channel.is_valid_token_id(101));
    assert!(!secure_channel.is_valid_token_id(100));
}

#[test]
fn clear_security_token() {
    let mut secure_channel = make_open_secure_channel(5, 100);
    secure_channel.clear_security_token();
    assert_eq!(secure_channel.secure_channel_id(), 0);
    assert_eq!(secure_channel.token_id(), 0);
    assert_eq!(secure_channel.previous_token_id(), None);
}

#[test]
fn renewal_predicate() {
    let mut secure_channel = SecureChannel::new(Role::Client, DecodingOptions::test());
    // No token, nothing to renew
    assert!(!secure_channel.should_renew_security_token());

    // A fresh token with a long lifetime is not due
    secure_channel.set_security_token(security_token(1, 1, 3_600_000));
    assert!(!secure_channel.should_renew_security_token());
    assert!(!secure_channel.token_has_expired());

    // A token with a tiny lifetime is past 75% almost immediately
    secure_channel.set_security_token(security_token(1, 2, 1));
    std::thread::sleep(std::time::Duration::from_millis(10));
    assert!(secure_channel.should_renew_security_token());
}

#[test]
fn renewal_period_is_three_quarters_of_lifetime() {
    let mut secure_channel = SecureChannel::new(Role::Client, DecodingOptions::test());
    secure_channel.set_security_token(security_token(1, 1, 60_000));
    assert_eq!(
        secure_channel.token_renewal_period(),
        std::time::Duration::from_millis(45_000)
    );
}

#[test]
fn random_nonce() {
    let mut secure_channel = SecureChannel::new(Role::Client, DecodingOptions::test());
    assert!(secure_channel.local_nonce_as_byte_string().is_null());
    secure_channel.create_random_nonce();
    assert_eq!(secure_channel.local_nonce().len(), 32);
    // Vanishingly unlikely to be all zeroes
    assert_ne!(secure_channel.local_nonce(), &[0u8; 32]);
    assert_eq!(secure_channel.local_nonce_as_byte_string().len(), 32);
}

#[test]
fn verify_accepts_current_and_previous_token() {
    init_logging();
    let mut secure_channel = make_open_secure_channel(1, 100);
    let request = make_sample_request(1);
    let chunks = Chunker::encode(1, 1, 0, 0, &secure_channel, &request).unwrap();
    let chunk_data = chunks[0].data.clone();

    // Chunk was made under token 100
    assert!(secure_channel.verify_and_remove_security(&chunk_data).is_ok());

    // After renewal to 101, token 100 is still acceptable
    secure_channel.set_security_token(security_token(1, 101, 3_600_000));
    assert!(secure_channel.verify_and_remove_security(&chunk_data).is_ok());

    // After a further renewal it is not
    secure_channel.set_security_token(security_token(1, 102, 3_600_000));
    assert_eq!(
        secure_channel
            .verify_and_remove_security(&chunk_data)
            .unwrap_err(),
        StatusCode::BadSecureChannelTokenUnknown
    );
}

#[test]
fn verify_rejects_truncated_chunk() {
    init_logging();
    let mut secure_channel = make_open_secure_channel(1, 100);
    let request = make_sample_request(1);
    let chunks = Chunker::encode(1, 1, 0, 0, &secure_channel, &request).unwrap();

    // The message size in the header no longer matches the buffer
    let chunk_data = &chunks[0].data[..chunks[0].data.len() - 1];
    assert_eq!(
        secure_channel
            .verify_and_remove_security(chunk_data)
            .unwrap_err(),
        StatusCode::BadDecodingError
    );
}

#[test]
fn verify_accepts_open_secure_channel_with_none_policy() {
    init_logging();
    let channel_for_encoding = SecureChannel::new(Role::Client, DecodingOptions::test());
    let request: SupportedMessage = OpenSecureChannelRequest {
        request_header: RequestHeader::new(&NodeId::null(), &DateTime::now(), 1),
        client_protocol_version: 0,
        request_type: SecurityTokenRequestType::Issue,
        security_mode: MessageSecurityMode::None,
        client_nonce: ByteString::from(&[0u8; 32]),
        requested_lifetime: 3_600_000,
    }
    .into();
    let chunks = Chunker::encode(1, 1, 0, 0, &channel_for_encoding, &request).unwrap();

    let mut secure_channel = SecureChannel::new(Role::Client, DecodingOptions::test());
    assert!(secure_channel
        .verify_and_remove_security(&chunks[0].data)
        .is_ok());
}

// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

use crate::core::comms::secure_channel::{Role, SecureChannel};
use crate::core::supported_message::SupportedMessage;
use crate::types::*;

mod chunk;
mod hello;
mod secure_channel;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Makes a secure channel as the client side would have one after a completed
/// open secure channel exchange.
pub fn make_open_secure_channel(channel_id: u32, token_id: u32) -> SecureChannel {
    let mut secure_channel = SecureChannel::new(Role::Client, DecodingOptions::test());
    secure_channel.set_security_token(ChannelSecurityToken {
        channel_id,
        token_id,
        created_at: DateTime::now(),
        revised_lifetime: 3_600_000,
    });
    secure_channel
}

/// A sample message for chunking tests.
pub fn make_sample_request(request_handle: u32) -> SupportedMessage {
    ReadRequest {
        request_header: RequestHeader::new(&NodeId::null(), &DateTime::now(), request_handle),
        max_age: 0.0,
        timestamps_to_return: TimestampsToReturn::Both,
        nodes_to_read: Some(vec![ReadValueId::from(NodeId::new(2, "sample"))]),
    }
    .into()
}

/// A sample message large enough that it must be split into several chunks
/// when encoded against the minimum chunk size.
pub fn make_large_request(request_handle: u32, node_count: u32) -> SupportedMessage {
    ReadRequest {
        request_header: RequestHeader::new(&NodeId::null(), &DateTime::now(), request_handle),
        max_age: 0.0,
        timestamps_to_return: TimestampsToReturn::Both,
        nodes_to_read: Some(
            (0..node_count)
                .map(|r| ReadValueId::from(NodeId::new(1, r)))
                .collect(),
        ),
    }
    .into()
}

// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

mod client;
mod services;

pub use client::{get_endpoints, Client};

use crate::client::config::SessionConfig;
use crate::types::{ByteString, Duration, NodeId, SignatureData};

/// An OPC UA session as described in Part 4, 5.6. Sessions are created by
/// [`Client::create_session`] in an unassociated state; activating one
/// associates it with the client, which then attaches its authentication
/// token to every subsequent request.
///
/// The record is immutable - the client publishes it through an atomic cell,
/// so concurrent readers always observe a consistent snapshot.
#[derive(Debug, Clone)]
pub struct Session {
    /// The session id the server assigned, used for diagnostics.
    session_id: NodeId,
    /// The secret authentication token the server issued. It is attached to
    /// every request made while this session is active.
    authentication_token: NodeId,
    /// The revised session timeout in milliseconds.
    session_timeout: Duration,
    /// The nonce the server supplied at creation. Needed to compute the
    /// client signature under the signing modes.
    server_nonce: ByteString,
    /// The server certificate, carried for the signing modes.
    server_certificate: ByteString,
    /// The signature expected from the server. Calculated under the signing
    /// modes, null otherwise.
    my_signature: SignatureData,
    /// The client signature to send in the next ActivateSession call.
    /// Calculated under the signing modes, null otherwise.
    signature_to_send: SignatureData,
    /// The configuration the session was created with.
    cfg: SessionConfig,
}

impl Session {
    pub fn session_id(&self) -> &NodeId {
        &self.session_id
    }

    pub fn authentication_token(&self) -> &NodeId {
        &self.authentication_token
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    pub fn server_nonce(&self) -> &ByteString {
        &self.server_nonce
    }

    pub fn server_certificate(&self) -> &ByteString {
        &self.server_certificate
    }

    /// The signature expected from the server, null under the `None` policy.
    pub fn my_signature(&self) -> &SignatureData {
        &self.my_signature
    }

    /// The client signature sent during activation, null under the `None` policy.
    pub fn signature_to_send(&self) -> &SignatureData {
        &self.signature_to_send
    }
}

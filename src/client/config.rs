// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Configuration for the secure channel and the session. The defaults are
//! convenience constructors, not hidden process state - anything that matters
//! can be supplied explicitly.

use std::time::Duration;

use rand::Rng;

use crate::client::transport::TransportConfiguration;
use crate::client::IdentityToken;
use crate::types::{
    constants, ApplicationDescription, ApplicationType, ByteString, LocalizedText,
    MessageSecurityMode, SignatureData, UAString,
};

/// The requested lifetime of a security token when none is configured, one hour.
const DEFAULT_REQUESTED_LIFETIME: u32 = 3_600_000;

/// How long a request waits for its response before failing with `BadTimeout`.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The session timeout requested from servers.
const DEFAULT_SESSION_TIMEOUT: f64 = 120_000.0;

/// Configuration of the secure channel.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The uri of the security policy. Only `SecurityPolicy#None` is
    /// supported; anything else is rejected when the channel is created.
    pub security_policy_uri: String,
    /// The message security mode. Only `None` is supported.
    pub security_mode: MessageSecurityMode,
    /// The client application instance certificate, sent during session
    /// creation. Null under the `None` policy.
    pub certificate: ByteString,
    /// The client private key. Reserved for the signing modes, unused here.
    pub private_key: ByteString,
    /// The security token lifetime asked for when opening and renewing the
    /// channel, in milliseconds. The server may revise it downwards.
    pub requested_lifetime: u32,
    /// The first request id the channel assigns. Subsequent ids count up from
    /// here without gaps.
    pub request_id_seed: u32,
    /// How long requests wait for their response.
    pub request_timeout: Duration,
    /// Transport buffer limits proposed in the hello message.
    pub transport: TransportConfiguration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        // A random positive seed, mirroring what most stacks do so request ids
        // from successive channels don't collide in server logs.
        Self::new(rand::thread_rng().gen_range(1..=i32::MAX as u32))
    }
}

impl ClientConfig {
    /// Creates a configuration for the `None` security policy with the
    /// supplied request id seed.
    pub fn new(request_id_seed: u32) -> Self {
        ClientConfig {
            security_policy_uri: constants::SECURITY_POLICY_NONE_URI.to_string(),
            security_mode: MessageSecurityMode::None,
            certificate: ByteString::null(),
            private_key: ByteString::null(),
            requested_lifetime: DEFAULT_REQUESTED_LIFETIME,
            request_id_seed,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            transport: TransportConfiguration {
                max_pending_incoming: 5,
                max_inflight: 20,
                send_buffer_size: 65_535,
                recv_buffer_size: 65_535,
                max_message_size: crate::types::constants::MAX_MESSAGE_SIZE,
                max_chunk_count: crate::types::constants::MAX_CHUNK_COUNT,
            },
        }
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn requested_lifetime(mut self, requested_lifetime: u32) -> Self {
        self.requested_lifetime = requested_lifetime;
        self
    }
}

/// Configuration of sessions created through the client.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Information that describes the client application to the server.
    pub client_description: ApplicationDescription,
    /// The locale ids sent during session activation, in order of preference.
    pub locale_ids: Vec<String>,
    /// The user identity the session is activated with.
    pub user_identity_token: IdentityToken,
    /// The signature over the user identity token, reserved for the signing
    /// modes and null otherwise.
    pub user_token_signature: SignatureData,
    /// The session timeout requested of the server, in milliseconds.
    pub session_timeout: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            client_description: ApplicationDescription {
                application_uri: UAString::from("urn:opcua-client"),
                product_uri: UAString::from("urn:opcua-client"),
                application_name: LocalizedText::new("", "opcua-client"),
                application_type: ApplicationType::Client,
                gateway_server_uri: UAString::null(),
                discovery_profile_uri: UAString::null(),
                discovery_urls: None,
            },
            locale_ids: vec!["en-US".to_string()],
            user_identity_token: IdentityToken::Anonymous,
            user_token_signature: SignatureData::null(),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

impl SessionConfig {
    pub fn user_identity_token(mut self, user_identity_token: IdentityToken) -> Self {
        self.user_identity_token = user_identity_token;
        self
    }

    pub fn locale_ids(mut self, locale_ids: Vec<String>) -> Self {
        self.locale_ids = locale_ids;
        self
    }
}

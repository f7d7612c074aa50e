// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The secure channel record - ids, tokens, nonces and the security checks
//! applied to chunks moving through the channel.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use chrono::Duration;
use rand::Rng;

use crate::core::comms::{
    message_chunk::{MessageChunk, MessageChunkHeader, MessageChunkType},
    security_header::{
        AsymmetricSecurityHeader, SecurityHeader, SymmetricSecurityHeader,
    },
};
use crate::types::{
    constants, encoding::*, ByteString, ChannelSecurityToken, DateTime, MessageSecurityMode,
    StatusCode,
};

/// Length in bytes of the nonces exchanged during the open secure channel
/// handshake.
pub const SECURE_CHANNEL_NONCE_LENGTH: usize = 32;

/// The security policy of a secure channel. Only `None` is implemented; the
/// signing policies defined by Part 7 are recognized so their rejection can be
/// explicit rather than a decoding failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SecurityPolicy {
    Unknown,
    None,
}

impl SecurityPolicy {
    pub fn to_uri(&self) -> &'static str {
        match self {
            SecurityPolicy::None => constants::SECURITY_POLICY_NONE_URI,
            SecurityPolicy::Unknown => {
                panic!("Unknown security policy has no uri");
            }
        }
    }

    pub fn from_uri(uri: &str) -> SecurityPolicy {
        match uri {
            constants::SECURITY_POLICY_NONE_URI => SecurityPolicy::None,
            _ => {
                error!("Security policy \"{}\" is unsupported", uri);
                SecurityPolicy::Unknown
            }
        }
    }
}

impl FromStr for SecurityPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SecurityPolicy::from_uri(s))
    }
}

impl fmt::Display for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityPolicy::None => write!(f, "None"),
            SecurityPolicy::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The side of the secure channel that a role belongs to, client or server.
#[derive(Debug, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// Holds all of the security information related to a secure channel - the
/// channel and token ids assigned by the server, token lifetimes, the nonces
/// exchanged at open, and the policy / mode in force.
#[derive(Debug)]
pub struct SecureChannel {
    /// The side of the secure channel that this role belongs to, client or server
    role: Role,
    /// The security policy for the connection
    security_policy: SecurityPolicy,
    /// The security mode for the connection, None, Sign, SignAndEncrypt
    security_mode: MessageSecurityMode,
    /// Secure channel id, assigned by the server on open
    secure_channel_id: u32,
    /// Token creation time
    token_created_at: DateTime,
    /// Token lifetime in milliseconds
    token_lifetime: u32,
    /// Token identifier, rotates on renewal
    token_id: u32,
    /// The previous token id. Messages under it are accepted for the overlap
    /// period that covers responses in flight during a renewal.
    previous_token_id: Option<u32>,
    /// Our certificate, carried in the create session exchange. Always null
    /// under the `None` policy.
    cert: ByteString,
    /// Their certificate
    remote_cert: ByteString,
    /// Their nonce provided by open secure channel
    remote_nonce: Vec<u8>,
    /// Our nonce generated while opening the secure channel
    local_nonce: Vec<u8>,
    /// Decoding options
    decoding_options: DecodingOptions,
}

impl SecureChannel {
    pub fn new(role: Role, decoding_options: DecodingOptions) -> SecureChannel {
        SecureChannel {
            role,
            security_policy: SecurityPolicy::None,
            security_mode: MessageSecurityMode::None,
            secure_channel_id: 0,
            token_created_at: DateTime::now(),
            token_lifetime: 0,
            token_id: 0,
            previous_token_id: None,
            cert: ByteString::null(),
            remote_cert: ByteString::null(),
            remote_nonce: Vec::new(),
            local_nonce: Vec::new(),
            decoding_options,
        }
    }

    pub fn is_client_role(&self) -> bool {
        self.role == Role::Client
    }

    pub fn security_policy(&self) -> SecurityPolicy {
        self.security_policy
    }

    /// Sets the security policy. Only `SecurityPolicy#None` is implemented,
    /// everything else is rejected here so the failure is explicit and early.
    pub fn set_security_policy(&mut self, security_policy: SecurityPolicy) -> Result<(), StatusCode> {
        if security_policy != SecurityPolicy::None {
            error!("Security policy {} is rejected, only None is supported", security_policy);
            return Err(StatusCode::BadSecurityPolicyRejected);
        }
        self.security_policy = security_policy;
        Ok(())
    }

    pub fn security_mode(&self) -> MessageSecurityMode {
        self.security_mode
    }

    /// Sets the security mode. The signing modes require the signature
    /// machinery this stack deliberately omits, so they are rejected.
    pub fn set_security_mode(&mut self, security_mode: MessageSecurityMode) -> Result<(), StatusCode> {
        if security_mode != MessageSecurityMode::None {
            error!("Security mode {:?} is rejected, only None is supported", security_mode);
            return Err(StatusCode::BadSecurityModeRejected);
        }
        self.security_mode = security_mode;
        Ok(())
    }

    pub fn set_cert(&mut self, cert: ByteString) {
        self.cert = cert;
    }

    pub fn cert(&self) -> ByteString {
        self.cert.clone()
    }

    pub fn set_remote_cert(&mut self, remote_cert: ByteString) {
        self.remote_cert = remote_cert;
    }

    pub fn remote_cert(&self) -> ByteString {
        self.remote_cert.clone()
    }

    pub fn clear_security_token(&mut self) {
        self.secure_channel_id = 0;
        self.token_id = 0;
        self.previous_token_id = None;
        self.token_created_at = DateTime::now();
        self.token_lifetime = 0;
    }

    /// Stores the token handed out by an open or renew response. On renewal
    /// the previous token remains acceptable until the next rotation.
    pub fn set_security_token(&mut self, channel_token: ChannelSecurityToken) {
        if self.token_id != 0 && channel_token.token_id != self.token_id {
            self.previous_token_id = Some(self.token_id);
        }
        self.secure_channel_id = channel_token.channel_id;
        self.token_id = channel_token.token_id;
        self.token_created_at = DateTime::now();
        self.token_lifetime = channel_token.revised_lifetime;
    }

    pub fn secure_channel_id(&self) -> u32 {
        self.secure_channel_id
    }

    pub fn token_id(&self) -> u32 {
        self.token_id
    }

    pub fn previous_token_id(&self) -> Option<u32> {
        self.previous_token_id
    }

    /// Tests if the supplied token id is acceptable on an inbound message -
    /// either the current token or the one it replaced.
    pub fn is_valid_token_id(&self, token_id: u32) -> bool {
        token_id == self.token_id || self.previous_token_id == Some(token_id)
    }

    pub fn token_created_at(&self) -> DateTime {
        self.token_created_at
    }

    pub fn token_lifetime(&self) -> u32 {
        self.token_lifetime
    }

    pub fn set_decoding_options(&mut self, decoding_options: DecodingOptions) {
        self.decoding_options = decoding_options;
    }

    pub fn decoding_options(&self) -> DecodingOptions {
        self.decoding_options.clone()
    }

    /// Test if the secure channel token needs to be renewed. The algorithm determines it needs
    /// to be renewed if the issue period has elapsed by 75% or more.
    pub fn should_renew_security_token(&self) -> bool {
        if self.token_id() == 0 {
            false
        } else {
            let renew_lifetime = (self.token_lifetime() / 4) * 3;
            let renew_lifetime = Duration::milliseconds(renew_lifetime as i64);
            DateTime::now() - self.token_created_at() > renew_lifetime
        }
    }

    /// How long from the token's creation until the renewal should fire,
    /// i.e. 75% of the revised lifetime.
    pub fn token_renewal_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(((self.token_lifetime() as u64) / 4) * 3)
    }

    /// Test if the token has expired yet
    pub fn token_has_expired(&self) -> bool {
        let token_expires =
            self.token_created_at + Duration::milliseconds(self.token_lifetime as i64);
        DateTime::now() >= token_expires
    }

    /// Makes a security header according to the type of message being sent, symmetric or asymmetric
    pub fn make_security_header(&self, message_type: MessageChunkType) -> SecurityHeader {
        match message_type {
            MessageChunkType::OpenSecureChannel => {
                SecurityHeader::Asymmetric(AsymmetricSecurityHeader::none())
            }
            _ => SecurityHeader::Symmetric(SymmetricSecurityHeader {
                token_id: self.token_id,
            }),
        }
    }

    /// Tests if the supplied policy uri matches the channel's policy.
    pub fn is_valid_security_policy_uri(&self, uri: &str) -> bool {
        SecurityPolicy::from_uri(uri) == self.security_policy
    }

    /// Creates a nonce for the channel, 32 random bytes.
    pub fn create_random_nonce(&mut self) {
        let mut rng = rand::thread_rng();
        self.local_nonce = vec![0u8; SECURE_CHANNEL_NONCE_LENGTH];
        rng.fill(&mut self.local_nonce[..]);
    }

    pub fn local_nonce(&self) -> &[u8] {
        &self.local_nonce
    }

    pub fn set_local_nonce(&mut self, local_nonce: &[u8]) {
        self.local_nonce.clear();
        self.local_nonce.extend_from_slice(local_nonce);
    }

    pub fn local_nonce_as_byte_string(&self) -> ByteString {
        if self.local_nonce.is_empty() {
            ByteString::null()
        } else {
            ByteString::from(&self.local_nonce)
        }
    }

    pub fn set_remote_nonce_from_byte_string(
        &mut self,
        remote_nonce: &ByteString,
    ) -> Result<(), StatusCode> {
        if let Some(ref remote_nonce) = remote_nonce.value {
            self.remote_nonce = remote_nonce.to_vec();
        } else {
            self.remote_nonce.clear();
        }
        Ok(())
    }

    pub fn remote_nonce(&self) -> &[u8] {
        &self.remote_nonce
    }

    pub fn remote_nonce_as_byte_string(&self) -> ByteString {
        if self.remote_nonce.is_empty() {
            ByteString::null()
        } else {
            ByteString::from(&self.remote_nonce)
        }
    }

    /// Applies security to a message chunk and writes the result to `dst`,
    /// returning the number of bytes written. Under the `None` policy the
    /// chunk passes through untouched.
    pub fn apply_security(&self, message_chunk: &MessageChunk, dst: &mut [u8]) -> Result<usize, StatusCode> {
        let size = message_chunk.data.len();
        if size > dst.len() {
            error!(
                "The size of the message chunk {} exceeds the size of the destination buffer {}",
                size,
                dst.len()
            );
            return Err(StatusCode::BadEncodingLimitsExceeded);
        }
        dst[..size].copy_from_slice(&message_chunk.data[..]);
        Ok(size)
    }

    /// Verifies the security of an inbound chunk and strips it off, yielding
    /// the verified chunk. Under the `None` policy this means validating the
    /// headers - the policy uri on open messages, the token id on everything
    /// else - and passing the bytes through.
    pub fn verify_and_remove_security(&mut self, src: &[u8]) -> Result<MessageChunk, StatusCode> {
        let mut stream = Cursor::new(&src);
        let message_header = MessageChunkHeader::decode(&mut stream, &self.decoding_options)?;

        let message_size = message_header.message_size as usize;
        if message_size != src.len() {
            error!(
                "The message size {} is not the same as the supplied buffer {}",
                message_size,
                src.len()
            );
            return Err(StatusCode::BadDecodingError);
        }

        if message_header.message_type.is_open_secure_channel() {
            // The open secure channel response arrives before any token is
            // established, so examine the security policy instead.
            let security_header =
                AsymmetricSecurityHeader::decode(&mut stream, &self.decoding_options)?;
            let security_policy_uri = security_header.security_policy_uri.as_ref();
            match SecurityPolicy::from_uri(security_policy_uri) {
                SecurityPolicy::None => {}
                _ => {
                    error!(
                        "Security policy \"{}\" of the open secure channel message is rejected",
                        security_policy_uri
                    );
                    return Err(StatusCode::BadSecurityPolicyRejected);
                }
            }
        } else {
            // Regular messages must arrive under the current token, or the
            // previous one while a renewal is being absorbed.
            let security_header =
                SymmetricSecurityHeader::decode(&mut stream, &self.decoding_options)?;
            if self.token_id != 0 && !self.is_valid_token_id(security_header.token_id) {
                error!(
                    "Token id {} is not the current token {} or the previous one {:?}",
                    security_header.token_id, self.token_id, self.previous_token_id
                );
                return Err(StatusCode::BadSecureChannelTokenUnknown);
            }
        }

        Ok(MessageChunk { data: src.to_vec() })
    }
}

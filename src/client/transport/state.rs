// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Request dispatch helpers and the open / renew state of the secure channel.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::RwLock;
use tokio::sync::mpsc::error::SendTimeoutError;

use crate::client::process_unexpected_response;
use crate::client::transport::OutgoingMessage;
use crate::core::comms::secure_channel::SecureChannel;
use crate::core::handle::AtomicHandle;
use crate::core::supported_message::SupportedMessage;
use crate::types::{
    DateTime, DiagnosticBits, ExtensionObject, NodeId, OpenSecureChannelRequest, RequestHeader,
    SecurityTokenRequestType, StatusCode, UAString,
};

pub(crate) type RequestSend = tokio::sync::mpsc::Sender<OutgoingMessage>;

/// A single request on its way into the outgoing queue. Dropping the future
/// returned by `send` before it completes abandons the request - the eventual
/// response is discarded by the transport when it finds no one waiting.
pub(crate) struct Request {
    payload: SupportedMessage,
    sender: RequestSend,
    timeout: Duration,
}

impl Request {
    pub fn new(payload: impl Into<SupportedMessage>, sender: RequestSend, timeout: Duration) -> Self {
        Self {
            payload: payload.into(),
            sender,
            timeout,
        }
    }

    /// Hands the request to the transport without waiting for any response.
    /// Used for CloseSecureChannel, which the server never answers.
    pub async fn send_no_response(self) -> Result<(), StatusCode> {
        let message = OutgoingMessage {
            request: self.payload,
            callback: None,
            deadline: Instant::now() + self.timeout,
        };

        match self.sender.send_timeout(message, self.timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Closed(_)) => Err(StatusCode::BadConnectionClosed),
            Err(SendTimeoutError::Timeout(_)) => Err(StatusCode::BadTimeout),
        }
    }

    /// Queues the request without waiting for space in the outgoing queue,
    /// returning the receiver the response will arrive on. Fails if the queue
    /// is full or the transport is gone. Used by the event loop, which must
    /// not block on its own queue.
    pub fn try_send(
        self,
    ) -> Result<tokio::sync::oneshot::Receiver<Result<SupportedMessage, StatusCode>>, StatusCode>
    {
        let (cb_send, cb_recv) = tokio::sync::oneshot::channel();

        let message = OutgoingMessage {
            request: self.payload,
            callback: Some(cb_send),
            deadline: Instant::now() + self.timeout,
        };

        self.sender.try_send(message).map_err(|err| match err {
            tokio::sync::mpsc::error::TrySendError::Closed(_) => StatusCode::BadConnectionClosed,
            tokio::sync::mpsc::error::TrySendError::Full(_) => StatusCode::BadInvalidState,
        })?;
        Ok(cb_recv)
    }

    /// Hands the request to the transport and waits for the response, up to
    /// the request's deadline.
    pub async fn send(self) -> Result<SupportedMessage, StatusCode> {
        let (cb_send, cb_recv) = tokio::sync::oneshot::channel();

        let message = OutgoingMessage {
            request: self.payload,
            callback: Some(cb_send),
            deadline: Instant::now() + self.timeout,
        };

        match self.sender.send_timeout(message, self.timeout).await {
            Ok(()) => (),
            Err(SendTimeoutError::Closed(_)) => return Err(StatusCode::BadConnectionClosed),
            Err(SendTimeoutError::Timeout(_)) => return Err(StatusCode::BadTimeout),
        }

        match cb_recv.await {
            Ok(r) => r,
            // The sender was dropped without completing, which means the
            // transport went away.
            Err(_) => Err(StatusCode::BadConnectionClosed),
        }
    }
}

/// The client side state of the secure channel - the request handle factory
/// and the logic of issuing and renewing the channel's security token.
pub(crate) struct SecureChannelState {
    /// Secure channel information
    secure_channel: Arc<RwLock<SecureChannel>>,
    /// The requested lifetime for security tokens
    requested_lifetime: u32,
    /// The next handle to assign to a request
    request_handle: AtomicHandle,
}

impl SecureChannelState {
    const FIRST_REQUEST_HANDLE: u32 = 1;

    pub fn new(secure_channel: Arc<RwLock<SecureChannel>>, requested_lifetime: u32) -> Self {
        SecureChannelState {
            secure_channel,
            requested_lifetime,
            request_handle: AtomicHandle::new(Self::FIRST_REQUEST_HANDLE),
        }
    }

    /// Constructs an OpenSecureChannel request for an issue or renewal,
    /// generating a fresh channel nonce as part of it.
    pub fn begin_issue_or_renew_secure_channel(
        &self,
        request_type: SecurityTokenRequestType,
        timeout: Duration,
        sender: RequestSend,
    ) -> Request {
        trace!("issue_or_renew_secure_channel({:?})", request_type);

        let (security_mode, client_nonce) = {
            let mut secure_channel = trace_write_lock!(self.secure_channel);
            secure_channel.create_random_nonce();
            (
                secure_channel.security_mode(),
                secure_channel.local_nonce_as_byte_string(),
            )
        };

        let request = OpenSecureChannelRequest {
            request_header: self.make_request_header(&NodeId::null(), timeout),
            client_protocol_version: 0,
            request_type,
            security_mode,
            client_nonce,
            requested_lifetime: self.requested_lifetime,
        };

        Request::new(request, sender, timeout)
    }

    /// Absorbs an OpenSecureChannel response, installing the security token it
    /// carries. Anything else - including a service fault - fails the open.
    pub fn end_issue_or_renew_secure_channel(
        &self,
        response: SupportedMessage,
    ) -> Result<(), StatusCode> {
        if let SupportedMessage::OpenSecureChannelResponse(response) = response {
            if response.response_header.service_result.is_bad() {
                error!(
                    "OpenSecureChannel was rejected, service result = {}",
                    response.response_header.service_result
                );
                return Err(response.response_header.service_result);
            }
            debug!(
                "Setting the security token, channel id = {}, token id = {}, revised lifetime = {}",
                response.security_token.channel_id,
                response.security_token.token_id,
                response.security_token.revised_lifetime
            );
            let mut secure_channel = trace_write_lock!(self.secure_channel);
            secure_channel.set_security_token(response.security_token.clone());
            secure_channel.set_remote_nonce_from_byte_string(&response.server_nonce)?;
            Ok(())
        } else {
            Err(process_unexpected_response(response))
        }
    }

    /// Construct a request header carrying the supplied authentication token.
    /// Requests made before a session is activated carry a null token.
    pub fn make_request_header(&self, authentication_token: &NodeId, timeout: Duration) -> RequestHeader {
        RequestHeader {
            authentication_token: authentication_token.clone(),
            timestamp: DateTime::now(),
            request_handle: self.request_handle.next(),
            return_diagnostics: DiagnosticBits::empty(),
            audit_entry_id: UAString::null(),
            timeout_hint: timeout.as_millis().min(u32::MAX as u128) as u32,
            additional_header: ExtensionObject::null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::comms::secure_channel::Role;
    use crate::types::DecodingOptions;

    fn make_state() -> SecureChannelState {
        let secure_channel = Arc::new(RwLock::new(SecureChannel::new(
            Role::Client,
            DecodingOptions::test(),
        )));
        SecureChannelState::new(secure_channel, 3_600_000)
    }

    #[test]
    fn request_handles_are_contiguous() {
        let state = make_state();
        let h1 = state
            .make_request_header(&NodeId::null(), Duration::from_secs(30))
            .request_handle;
        let h2 = state
            .make_request_header(&NodeId::null(), Duration::from_secs(30))
            .request_handle;
        let h3 = state
            .make_request_header(&NodeId::null(), Duration::from_secs(30))
            .request_handle;
        assert_eq!(h1, 1);
        assert_eq!(h2, 2);
        assert_eq!(h3, 3);
    }

    #[test]
    fn request_header_carries_token_and_timeout() {
        let state = make_state();
        let token = NodeId::new(0, 1000u32);
        let header = state.make_request_header(&token, Duration::from_secs(30));
        assert_eq!(header.authentication_token, token);
        assert_eq!(header.timeout_hint, 30_000);
        assert!(header.additional_header.is_null());
    }

    #[test]
    fn end_issue_rejects_unexpected_response() {
        use crate::types::{RequestHeader, ServiceFault};

        let state = make_state();

        // A service fault surfaces its own service result
        let fault = ServiceFault::new(
            &RequestHeader::default(),
            StatusCode::BadSecurityChecksFailed,
        );
        let err = state
            .end_issue_or_renew_secure_channel(fault.into())
            .unwrap_err();
        assert_eq!(err, StatusCode::BadSecurityChecksFailed);

        // Any other message type is an unknown response
        let response = crate::types::CloseSessionResponse {
            response_header: crate::types::ResponseHeader::null(),
        };
        let err = state
            .end_issue_or_renew_secure_channel(response.into())
            .unwrap_err();
        assert_eq!(err, StatusCode::BadUnknownResponse);
    }
}

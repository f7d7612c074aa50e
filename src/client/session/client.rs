// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The high-level client for an OPC UA server. It establishes a secure
//! channel and at most one active session, and dispatches typed requests
//! over the channel with the session's authentication token attached.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use rand::Rng;

use crate::client::config::{ClientConfig, SessionConfig};
use crate::client::transport::AsyncSecureChannel;
use crate::client::{process_service_result, process_unexpected_response, IdentityToken};
use crate::core::supported_message::SupportedMessage;
use crate::types::{
    AnonymousIdentityToken, ByteString, CloseSessionRequest, CreateSessionRequest,
    EndpointDescription, ExtensionObject, GetEndpointsRequest, IssuedIdentityToken, NodeId,
    ObjectId, RequestHeader, SignatureData, StatusCode, UAString, UserNameIdentityToken,
    X509IdentityToken,
};

use super::Session;

/// Returns the available endpoint descriptions for the server, dialling a
/// throwaway channel to ask for them. No session is created.
pub async fn get_endpoints(endpoint_url: &str) -> Result<Vec<EndpointDescription>, StatusCode> {
    let mut client = Client::new(
        endpoint_url,
        ClientConfig::default(),
        SessionConfig::default(),
    );
    client.dial().await?;
    let result = client.get_endpoints().await;
    let _ = client.close().await;
    result
}

/// A high-level client for an OPC UA server.
///
/// The client owns at most one secure channel at a time, established by
/// [`Client::dial`], and at most one active session, established by
/// [`Client::activate_session`]. [`Client::connect`] composes the whole
/// connect sequence.
///
/// Service calls may be issued concurrently from any task through a shared
/// reference. The lifecycle operations - connect, dial, close - take `&mut
/// self` and must be serialized by the caller, which the borrow checker
/// enforces.
pub struct Client {
    /// The endpoint url this client connects to.
    endpoint_url: String,
    /// Configuration of the secure channel.
    config: ClientConfig,
    /// Configuration for sessions created by this client.
    session_config: SessionConfig,
    /// The open secure channel, at most one.
    channel: Option<Arc<AsyncSecureChannel>>,
    /// The task driving the channel's transport and renewal timer.
    event_loop_handle: Option<tokio::task::JoinHandle<StatusCode>>,
    /// The active session, at most one, read and replaced atomically.
    session: ArcSwapOption<Session>,
}

impl Client {
    /// Creates a client for the supplied endpoint url. Nothing is connected
    /// until [`Client::connect`] or [`Client::dial`] is called.
    pub fn new(
        endpoint_url: impl Into<String>,
        config: ClientConfig,
        session_config: SessionConfig,
    ) -> Client {
        Client {
            endpoint_url: endpoint_url.into(),
            config,
            session_config,
            channel: None,
            event_loop_handle: None,
            session: ArcSwapOption::empty(),
        }
    }

    /// Establishes a secure channel, then creates and activates a session.
    /// Fails with `BadInvalidState` if the client is already connected. If any
    /// step after the dial fails, the channel is closed again before the error
    /// is returned.
    pub async fn connect(&mut self) -> Result<(), StatusCode> {
        if self.channel.is_some() {
            error!("Cannot connect, already connected");
            return Err(StatusCode::BadInvalidState);
        }
        self.dial().await?;
        let session = match self.create_session().await {
            Ok(session) => session,
            Err(status) => {
                let _ = self.close().await;
                return Err(status);
            }
        };
        if let Err(status) = self.activate_session(session).await {
            let _ = self.close().await;
            return Err(status);
        }
        Ok(())
    }

    /// Establishes the secure channel - opens the UACP transport, performs
    /// the hello / acknowledge handshake and the OpenSecureChannel exchange,
    /// and spawns the task that owns the socket from then on.
    ///
    /// Fails with `BadInvalidState` if a channel already exists.
    pub async fn dial(&mut self) -> Result<(), StatusCode> {
        if self.channel.is_some() {
            error!("Cannot dial, the secure channel is already connected");
            return Err(StatusCode::BadInvalidState);
        }
        let channel = Arc::new(AsyncSecureChannel::new(&self.endpoint_url, &self.config)?);
        let event_loop = channel.connect().await?;
        self.event_loop_handle = Some(tokio::spawn(event_loop.run()));
        self.channel = Some(channel);
        Ok(())
    }

    /// Closes the session, best effort, and then the secure channel. Errors
    /// from the session close are swallowed so the channel gets closed
    /// regardless; errors from the channel close are returned.
    pub async fn close(&mut self) -> Result<(), StatusCode> {
        // Try to close the session but ignore any error so that the
        // underlying channel and connection are closed regardless.
        let _ = self.close_session().await;
        self.session.store(None);

        let result = match self.channel.take() {
            Some(channel) => channel.close_channel().await,
            None => Err(StatusCode::BadNotConnected),
        };
        if let Some(handle) = self.event_loop_handle.take() {
            if result.is_ok() {
                // The transport closes itself once the CloseSecureChannel
                // request has been written out.
                let _ = handle.await;
            } else {
                handle.abort();
            }
        }
        result
    }

    /// Returns the active session, or `None` when no session is active. The
    /// read is atomic - concurrent activations are observed either before or
    /// after, never torn.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.load_full()
    }

    /// The endpoint url the client connects to.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// The secure channel id the server assigned, or 0 when not connected.
    pub fn secure_channel_id(&self) -> u32 {
        self.channel
            .as_ref()
            .map(|c| c.secure_channel_id())
            .unwrap_or(0)
    }

    fn channel(&self) -> Result<&Arc<AsyncSecureChannel>, StatusCode> {
        self.channel.as_ref().ok_or(StatusCode::BadNotConnected)
    }

    /// Constructs a request header for the next request. If a session is
    /// active its authentication token is attached, otherwise the token is
    /// null.
    pub fn make_request_header(&self) -> Result<RequestHeader, StatusCode> {
        let channel = self.channel()?;
        let authentication_token = match self.session.load_full() {
            Some(session) => session.authentication_token().clone(),
            None => NodeId::null(),
        };
        Ok(channel.make_request_header(&authentication_token, self.config.request_timeout))
    }

    /// Sends the request over the secure channel and waits for the response.
    /// The request is expected to carry a header made with
    /// [`Client::make_request_header`], which is how the active session's
    /// authentication token gets attached.
    pub async fn send(
        &self,
        request: impl Into<SupportedMessage>,
    ) -> Result<SupportedMessage, StatusCode> {
        let channel = self.channel()?;
        channel.send(request, self.config.request_timeout).await
    }

    /// Asks the server for its endpoints. May be called on a dialled channel
    /// without an active session.
    pub async fn get_endpoints(&self) -> Result<Vec<EndpointDescription>, StatusCode> {
        let request = GetEndpointsRequest {
            request_header: self.make_request_header()?,
            endpoint_url: UAString::from(self.endpoint_url.as_str()),
            locale_ids: None,
            profile_uris: None,
        };
        let response = self.send(request).await?;
        if let SupportedMessage::GetEndpointsResponse(response) = response {
            process_service_result(&response.response_header)?;
            Ok(response.endpoints.unwrap_or_default())
        } else {
            Err(process_unexpected_response(response))
        }
    }

    /// Creates a new session which is not yet activated and not associated
    /// with the client. Call [`Client::activate_session`] to both activate and
    /// associate the session.
    ///
    /// See Part 4, 5.6.2.
    pub async fn create_session(&self) -> Result<Session, StatusCode> {
        let channel = self.channel()?;

        let client_nonce = {
            let mut nonce = vec![0u8; 32];
            rand::thread_rng().fill(&mut nonce[..]);
            ByteString::from(nonce)
        };
        let session_name = format!(
            "gopcua-{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );

        let request = CreateSessionRequest {
            // The authentication token is always null for this request, even
            // if another session is currently active on the channel.
            request_header: channel
                .make_request_header(&NodeId::null(), self.config.request_timeout),
            client_description: self.session_config.client_description.clone(),
            server_uri: UAString::null(),
            endpoint_url: UAString::from(self.endpoint_url.as_str()),
            session_name: UAString::from(session_name),
            client_nonce,
            client_certificate: self.config.certificate.clone(),
            requested_session_timeout: self.session_config.session_timeout,
            max_response_message_size: 0,
        };

        let response = self.send(request).await?;
        if let SupportedMessage::CreateSessionResponse(response) = response {
            process_service_result(&response.response_header)?;
            channel.set_remote_cert(response.server_certificate.clone());
            Ok(Session {
                session_id: response.session_id.clone(),
                authentication_token: response.authentication_token.clone(),
                session_timeout: response.revised_session_timeout,
                server_nonce: response.server_nonce.clone(),
                server_certificate: response.server_certificate.clone(),
                my_signature: SignatureData::null(),
                signature_to_send: SignatureData::null(),
                cfg: self.session_config.clone(),
            })
        } else {
            Err(process_unexpected_response(response))
        }
    }

    /// Activates the session and associates it with the client. If the client
    /// already has an active session it is closed on the wire first. To retain
    /// the current session instead, call [`Client::detach_session`] before
    /// activating.
    ///
    /// If closing the previous session fails, the newly activated session is
    /// closed again and the error from the close is returned, leaving the
    /// channel usable.
    ///
    /// See Part 4, 5.6.3.
    pub async fn activate_session(&self, session: Session) -> Result<(), StatusCode> {
        let channel = self.channel()?;

        let (user_identity_token, user_token_signature) = self.user_identity_token(&session)?;
        let locale_ids = if session.cfg.locale_ids.is_empty() {
            None
        } else {
            Some(
                session
                    .cfg
                    .locale_ids
                    .iter()
                    .map(UAString::from)
                    .collect(),
            )
        };

        let request = crate::types::ActivateSessionRequest {
            request_header: channel
                .make_request_header(&session.authentication_token, self.config.request_timeout),
            client_signature: session.signature_to_send.clone(),
            client_software_certificates: None,
            locale_ids,
            user_identity_token,
            user_token_signature,
        };

        let response = self.send(request).await?;
        if let SupportedMessage::ActivateSessionResponse(response) = response {
            process_service_result(&response.response_header)?;

            let session = Arc::new(session);
            // Close the previously active session, if any. If that fails, the
            // new session is closed as well and the close error surfaces -
            // but only the initial error is reported.
            if let Err(status) = self.close_session().await {
                let _ = self.close_session_on_wire(&session).await;
                return Err(status);
            }
            self.session.store(Some(session));
            Ok(())
        } else {
            Err(process_unexpected_response(response))
        }
    }

    /// Closes the active session on the wire and clears it from the client.
    /// Does nothing if no session is active.
    ///
    /// See Part 4, 5.6.4.
    pub async fn close_session(&self) -> Result<(), StatusCode> {
        let Some(session) = self.session.load_full() else {
            return Ok(());
        };
        self.close_session_on_wire(&session).await?;
        self.session.store(None);
        Ok(())
    }

    /// Removes the session from the client without closing it on the wire.
    /// The caller is responsible for closing or re-activating it. Returns
    /// `None` when no session was active.
    pub fn detach_session(&self) -> Option<Arc<Session>> {
        self.session.swap(None)
    }

    /// Closes the given session on the wire without touching the active
    /// session cell.
    async fn close_session_on_wire(&self, session: &Session) -> Result<(), StatusCode> {
        let channel = self.channel()?;
        let request = CloseSessionRequest {
            request_header: channel
                .make_request_header(&session.authentication_token, self.config.request_timeout),
            delete_subscriptions: true,
        };
        let response = self.send(request).await?;
        if let SupportedMessage::CloseSessionResponse(_) = response {
            Ok(())
        } else {
            error!("close_session failed");
            Err(process_unexpected_response(response))
        }
    }

    /// Builds the user identity token and its signature for session
    /// activation from the session's configuration.
    fn user_identity_token(
        &self,
        session: &Session,
    ) -> Result<(ExtensionObject, SignatureData), StatusCode> {
        let signature = session.cfg.user_token_signature.clone();
        let token = match &session.cfg.user_identity_token {
            IdentityToken::Anonymous => {
                let identity_token = AnonymousIdentityToken::default();
                ExtensionObject::from_encodable(
                    ObjectId::AnonymousIdentityToken_Encoding_DefaultBinary,
                    &identity_token,
                )
            }
            IdentityToken::UserName(user, pass) => {
                // Note: with no channel encryption the password travels in
                // plain text, which is all the None policy can offer.
                let identity_token = UserNameIdentityToken {
                    policy_id: UAString::from("username"),
                    user_name: UAString::from(user.as_str()),
                    password: ByteString::from(pass.as_bytes()),
                    encryption_algorithm: UAString::null(),
                };
                ExtensionObject::from_encodable(
                    ObjectId::UserNameIdentityToken_Encoding_DefaultBinary,
                    &identity_token,
                )
            }
            IdentityToken::X509(certificate_data) => {
                let identity_token = X509IdentityToken {
                    policy_id: UAString::from("certificate"),
                    certificate_data: certificate_data.clone(),
                };
                ExtensionObject::from_encodable(
                    ObjectId::X509IdentityToken_Encoding_DefaultBinary,
                    &identity_token,
                )
            }
            IdentityToken::IssuedToken(token_data) => {
                let identity_token = IssuedIdentityToken {
                    policy_id: UAString::from("issuedtoken"),
                    token_data: token_data.clone(),
                    encryption_algorithm: UAString::null(),
                };
                ExtensionObject::from_encodable(
                    ObjectId::IssuedIdentityToken_Encoding_DefaultBinary,
                    &identity_token,
                )
            }
        };
        Ok((token, signature))
    }
}

// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The async secure channel - the facade over the transport task that opens
//! the channel, keeps its token renewed and dispatches requests.

use std::{sync::Arc, time::Duration};

use arc_swap::ArcSwapOption;
use futures::future::Either;
use parking_lot::RwLock;
use tokio::sync::oneshot;

use super::core::TransportPollResult;
use super::state::{Request, RequestSend, SecureChannelState};
use super::tcp::{TcpTransport, TransportConfiguration};
use crate::client::config::ClientConfig;
use crate::core::comms::secure_channel::{Role, SecureChannel, SecurityPolicy};
use crate::core::supported_message::SupportedMessage;
use crate::types::{
    CloseSecureChannelRequest, DateTime, DecodingOptions, NodeId, RequestHeader,
    SecurityTokenRequestType, StatusCode,
};

/// How long the open secure channel and close secure channel exchanges may
/// take before they are abandoned.
const CHANNEL_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Wrapper around an open secure channel. Requests are handed over to a
/// transport task which owns the socket; the caller polls the returned
/// [`SecureChannelEventLoop`] (or spawns it) to drive I/O.
pub struct AsyncSecureChannel {
    endpoint_url: String,
    secure_channel: Arc<RwLock<SecureChannel>>,
    state: Arc<SecureChannelState>,
    transport_config: TransportConfiguration,
    initial_request_id: u32,
    request_send: ArcSwapOption<RequestSend>,
}

/// The event loop of an open secure channel. Polling it drives the transport
/// and the token renewal timer; it runs until the channel closes.
pub struct SecureChannelEventLoop {
    transport: TcpTransport,
    secure_channel: Arc<RwLock<SecureChannel>>,
    state: Arc<SecureChannelState>,
    request_send: RequestSend,
    /// The response slot of a renewal in flight, if any.
    renew_response: Option<oneshot::Receiver<Result<SupportedMessage, StatusCode>>>,
}

impl SecureChannelEventLoop {
    /// Run the event loop to completion, returning the status the channel
    /// closed with.
    pub async fn run(mut self) -> StatusCode {
        loop {
            if let TransportPollResult::Closed(status) = self.poll().await {
                return status;
            }
        }
    }

    /// The time at which the security token should be renewed - 75% of the
    /// way through its revised lifetime - or `None` when there is no token or
    /// a renewal is already in flight.
    fn next_renewal_deadline(&self) -> Option<tokio::time::Instant> {
        if self.renew_response.is_some() {
            return None;
        }
        let secure_channel = trace_read_lock!(self.secure_channel);
        if secure_channel.token_id() == 0 {
            return None;
        }
        let elapsed = (DateTime::now() - secure_channel.token_created_at())
            .to_std()
            .unwrap_or_default();
        let remaining = secure_channel.token_renewal_period().saturating_sub(elapsed);
        Some(tokio::time::Instant::now() + remaining)
    }

    pub async fn poll(&mut self) -> TransportPollResult {
        if let Some(mut recv) = self.renew_response.take() {
            // A renewal is in flight. Keep polling the transport, it is what
            // delivers the renewal response.
            tokio::select! {
                r = self.transport.poll() => {
                    if !matches!(r, TransportPollResult::Closed(_)) {
                        self.renew_response = Some(recv);
                    }
                    r
                }
                r = &mut recv => {
                    self.handle_renew_response(r).await
                }
            }
        } else {
            let renew_timer = match self.next_renewal_deadline() {
                Some(deadline) => Either::Left(tokio::time::sleep_until(deadline)),
                None => Either::Right(futures::future::pending::<()>()),
            };
            tokio::select! {
                r = self.transport.poll() => r,
                _ = renew_timer => {
                    self.begin_renew();
                    TransportPollResult::OutgoingMessage
                }
            }
        }
    }

    /// Synthesizes an OpenSecureChannel renew request and queues it on the
    /// transport. If the outgoing queue is full the attempt is skipped; the
    /// timer remains due and fires again on the next poll.
    fn begin_renew(&mut self) {
        debug!("Renewing the secure channel security token");
        let request = self.state.begin_issue_or_renew_secure_channel(
            SecurityTokenRequestType::Renew,
            CHANNEL_REQUEST_TIMEOUT,
            self.request_send.clone(),
        );
        match request.try_send() {
            Ok(recv) => self.renew_response = Some(recv),
            Err(err) => {
                warn!("Unable to queue the token renewal request, error = {}", err);
            }
        }
    }

    async fn handle_renew_response(
        &mut self,
        response: Result<Result<SupportedMessage, StatusCode>, oneshot::error::RecvError>,
    ) -> TransportPollResult {
        let status = match response {
            Ok(Ok(response)) => match self.state.end_issue_or_renew_secure_channel(response) {
                Ok(()) => {
                    debug!("Secure channel security token was renewed");
                    return TransportPollResult::RenewedSecureChannel;
                }
                Err(e) => e,
            },
            Ok(Err(e)) => e,
            Err(_) => StatusCode::BadConnectionClosed,
        };
        // A failed renewal is fatal to the channel
        error!("Failed to renew the security token, error = {}", status);
        let status = self.transport.close(status).await;
        TransportPollResult::Closed(status)
    }
}

impl AsyncSecureChannel {
    pub fn new(endpoint_url: &str, config: &ClientConfig) -> Result<Self, StatusCode> {
        let decoding_options = DecodingOptions {
            max_message_size: config.transport.max_message_size,
            max_chunk_count: config.transport.max_chunk_count,
            ..Default::default()
        };
        let mut secure_channel = SecureChannel::new(Role::Client, decoding_options);
        secure_channel.set_security_policy(SecurityPolicy::from_uri(&config.security_policy_uri))?;
        secure_channel.set_security_mode(config.security_mode)?;
        secure_channel.set_cert(config.certificate.clone());

        let secure_channel = Arc::new(RwLock::new(secure_channel));

        Ok(Self {
            endpoint_url: endpoint_url.to_string(),
            state: Arc::new(SecureChannelState::new(
                secure_channel.clone(),
                config.requested_lifetime,
            )),
            secure_channel,
            transport_config: config.transport.clone(),
            initial_request_id: config.request_id_seed,
            request_send: Default::default(),
        })
    }

    /// Connect the transport and run the open secure channel handshake. On
    /// success the channel is usable for requests once the returned event loop
    /// is being polled. On failure the connection, if one was made, is
    /// dropped.
    pub async fn connect(&self) -> Result<SecureChannelEventLoop, StatusCode> {
        self.request_send.store(None);
        {
            let mut secure_channel = trace_write_lock!(self.secure_channel);
            secure_channel.clear_security_token();
        }

        let (send, recv) = tokio::sync::mpsc::channel(self.transport_config.max_inflight);
        let mut transport = TcpTransport::connect(
            self.secure_channel.clone(),
            recv,
            self.transport_config.clone(),
            self.initial_request_id,
            &self.endpoint_url,
        )
        .await?;

        let request = self.state.begin_issue_or_renew_secure_channel(
            SecurityTokenRequestType::Issue,
            CHANNEL_REQUEST_TIMEOUT,
            send.clone(),
        );

        let request_fut = request.send();
        tokio::pin!(request_fut);

        // Temporarily poll the transport while we're waiting for the open
        // secure channel response - it is the transport that delivers it.
        let resp = loop {
            tokio::select! {
                r = &mut request_fut => break r?,
                r = transport.poll() => {
                    if let TransportPollResult::Closed(e) = r {
                        return Err(e);
                    }
                }
            }
        };

        self.state.end_issue_or_renew_secure_channel(resp)?;
        self.request_send.store(Some(Arc::new(send.clone())));

        Ok(SecureChannelEventLoop {
            transport,
            secure_channel: self.secure_channel.clone(),
            state: self.state.clone(),
            request_send: send,
            renew_response: None,
        })
    }

    /// Send a request over the channel and wait for the response, up to the
    /// supplied timeout. The request is expected to carry a header made by
    /// [`Self::make_request_header`].
    pub async fn send(
        &self,
        request: impl Into<SupportedMessage>,
        timeout: Duration,
    ) -> Result<SupportedMessage, StatusCode> {
        let Some(send) = self.request_send.load().as_deref().cloned() else {
            return Err(StatusCode::BadNotConnected);
        };
        Request::new(request, send, timeout).send().await
    }

    /// Construct a request header carrying the supplied authentication token.
    pub fn make_request_header(&self, authentication_token: &NodeId, timeout: Duration) -> RequestHeader {
        self.state.make_request_header(authentication_token, timeout)
    }

    pub fn secure_channel_id(&self) -> u32 {
        let secure_channel = trace_read_lock!(self.secure_channel);
        secure_channel.secure_channel_id()
    }

    pub(crate) fn set_remote_cert(&self, cert: crate::types::ByteString) {
        let mut secure_channel = trace_write_lock!(self.secure_channel);
        secure_channel.set_remote_cert(cert);
    }

    /// Close the secure channel. A CloseSecureChannelRequest is sent
    /// best-effort - the server does not respond to it, it just drops the
    /// channel - and afterwards the channel refuses further requests.
    pub async fn close_channel(&self) -> Result<(), StatusCode> {
        let msg = CloseSecureChannelRequest {
            request_header: self
                .state
                .make_request_header(&NodeId::null(), CHANNEL_REQUEST_TIMEOUT),
        };

        // Take the sender so that nothing else can be queued after the close.
        let sender = self.request_send.swap(None);
        if let Some(sender) = sender {
            Request::new(msg, (*sender).clone(), CHANNEL_REQUEST_TIMEOUT)
                .send_no_response()
                .await
        } else {
            Ok(())
        }
    }
}

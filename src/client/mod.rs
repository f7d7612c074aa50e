// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! The OPC UA client module. It contains the connection machinery a client
//! needs to talk to a server - dialling the transport, opening and renewing a
//! secure channel, creating and activating a session - and the [`Client`]
//! facade that ties them together with a typed request dispatcher.
//!
//! The lifecycle mirrors the protocol:
//!
//! 1. [`Client::dial`] opens the UACP transport and the secure channel.
//! 2. [`Client::create_session`] / [`Client::activate_session`] establish a
//!    session - or [`Client::connect`] which composes all three.
//! 3. Service calls go through [`Client::send`] or the convenience wrappers;
//!    the active session's authentication token is attached automatically.
//! 4. [`Client::close`] winds the session and channel down again.

mod config;
mod session;
#[cfg(test)]
mod tests;
mod transport;

pub use config::{ClientConfig, SessionConfig};
pub use session::{get_endpoints, Client, Session};
pub use transport::{
    AsyncSecureChannel, SecureChannelEventLoop, TransportConfiguration, TransportPollResult,
};

use crate::core::supported_message::SupportedMessage;
use crate::types::{ByteString, ResponseHeader, StatusCode};

/// A user identity a session can be activated with. Only tokens that work
/// without channel encryption are practical under the `None` security policy;
/// a user name / password in particular travels in plain text.
#[derive(Debug, Clone)]
pub enum IdentityToken {
    /// Anonymous identity token
    Anonymous,
    /// User name and password
    UserName(String, String),
    /// X509 certificate data
    X509(ByteString),
    /// A token issued by an external authority
    IssuedToken(ByteString),
}

/// Process the service result, i.e. where the request "succeeded" but the response
/// contains a failure status code.
pub(crate) fn process_service_result(response_header: &ResponseHeader) -> Result<(), StatusCode> {
    if response_header.service_result.is_bad() {
        info!(
            "Received a bad service result {} from the request",
            response_header.service_result
        );
        Err(response_header.service_result)
    } else {
        Ok(())
    }
}

/// Turn a response of the wrong type into the status code to fail the caller
/// with. A service fault carries the real reason, anything else is unknown.
pub(crate) fn process_unexpected_response(response: SupportedMessage) -> StatusCode {
    match response {
        SupportedMessage::ServiceFault(service_fault) => {
            error!(
                "Received a service fault of {} for the request",
                service_fault.response_header.service_result
            );
            service_fault.response_header.service_result
        }
        _ => {
            error!("Received an unexpected response to the request");
            StatusCode::BadUnknownResponse
        }
    }
}

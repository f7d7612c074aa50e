// opcua-client - an OPC UA client communication stack
// SPDX-License-Identifier: MPL-2.0

//! Client side OPC UA (IEC 62541) communication stack.
//!
//! The stack is layered the same way the protocol is:
//!
//! * [`types`] - the OPC UA binary codec. Built-in types, service request /
//!   response types and the numeric ids that identify them on the wire.
//! * [`core`] - the UA Connection Protocol (UACP) framing and the UA Secure
//!   Conversation (UASC) chunking that sits on top of a TCP stream.
//! * [`client`] - the connection machinery. A tokio task owns the socket and
//!   multiplexes requests and responses, the [`client::Client`] facade holds
//!   the secure channel and at most one active session.
//!
//! Only the `None` security policy is supported. The security headers and
//! signature fields required by the signing modes are carried on the wire so
//! the message layouts are complete, but requesting `Sign` or
//! `SignAndEncrypt` is rejected when the channel is configured.
//!
//! ```no_run
//! use opcua_client::client::{Client, ClientConfig, SessionConfig};
//! use opcua_client::types::NodeId;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut client = Client::new(
//!         "opc.tcp://127.0.0.1:4840/",
//!         ClientConfig::default(),
//!         SessionConfig::default(),
//!     );
//!     client.connect().await.unwrap();
//!     let value = client.read_value(&NodeId::new(2, "Counter")).await.unwrap();
//!     println!("value = {:?}", value);
//!     client.close().await.unwrap();
//! }
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;

/// Tracing macro for obtaining a lock on a `Mutex`. Sometimes deadlocks can happen in code,
/// and if they do, this macro is useful for finding out where they happened.
#[macro_export]
macro_rules! trace_lock {
    ( $x:expr ) => {{
        let v = $x.lock();
        v
    }};
}

/// Tracing macro for obtaining a read lock on a `RwLock`.
#[macro_export]
macro_rules! trace_read_lock {
    ( $x:expr ) => {{
        let v = $x.read();
        v
    }};
}

/// Tracing macro for obtaining a write lock on a `RwLock`.
#[macro_export]
macro_rules! trace_write_lock {
    ( $x:expr ) => {{
        let v = $x.write();
        v
    }};
}

pub mod client;
pub mod core;
pub mod types;

pub mod prelude {
    pub use crate::client::{Client, ClientConfig, IdentityToken, Session, SessionConfig};
    pub use crate::core::prelude::*;
    pub use crate::types::*;
}

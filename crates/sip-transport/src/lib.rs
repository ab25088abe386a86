//! SIP transport layer for the wsphone stack
//!
//! This crate provides the [`Transport`] abstraction used by the transaction
//! layer and its one production implementation: a client-side secure
//! WebSocket connection negotiated with the `sip` subprotocol.

pub mod error;
pub mod transport;

pub use error::{Error, Result};
pub use transport::ws::{websocket_url, WebSocketTransport};
pub use transport::{Transport, TransportEvent};

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::{Error, Result, Transport, TransportEvent, WebSocketTransport};
}

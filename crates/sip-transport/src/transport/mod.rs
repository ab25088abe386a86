pub mod ws;

use std::fmt;

use wsphone_sip_core::Message;

use crate::error::Result;

/// Events emitted by a transport's receive loop
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A complete SIP message arrived
    MessageReceived {
        /// The parsed message
        message: Message,
    },

    /// A frame could not be read or parsed; the frame is dropped
    Error {
        /// Description of what went wrong
        error: String,
    },

    /// The connection is gone; no further events follow
    Closed,
}

/// One persistent duplex connection carrying whole SIP messages
#[async_trait::async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends a SIP message to the remote end
    async fn send_message(&self, message: &Message) -> Result<()>;

    /// Closes the connection
    async fn close(&self) -> Result<()>;

    /// Returns whether the transport is closed
    fn is_closed(&self) -> bool;
}

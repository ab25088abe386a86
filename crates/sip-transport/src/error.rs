use thiserror::Error;

/// Result type for SIP transport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SIP transport operations
#[derive(Error, Debug)]
pub enum Error {
    /// The outbound proxy could not be turned into a WebSocket URL
    #[error("Invalid WebSocket URL {0}: {1}")]
    InvalidUrl(String, String),

    /// Failed to connect to the specified URL
    #[error("Failed to connect to {0}: {1}")]
    ConnectFailed(String, String),

    /// WebSocket handshake failed
    #[error("WebSocket handshake failed: {0}")]
    WebSocketHandshakeFailed(String),

    /// WebSocket protocol error
    #[error("WebSocket protocol error: {0}")]
    WebSocketProtocolError(String),

    /// Failed to send a message
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    /// Connection closed by peer
    #[error("Connection closed by peer")]
    ConnectionClosedByPeer,

    /// Transport is closed
    #[error("Transport closed")]
    TransportClosed,
}

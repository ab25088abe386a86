use std::time::Duration;

use thiserror::Error;

/// Result type for transaction operations
pub type Result<T> = std::result::Result<T, TransactionError>;

/// Errors raised while sending a request and waiting for its response
#[derive(Error, Debug)]
pub enum TransactionError {
    /// No response with a matching `CSeq` arrived in time
    #[error("Transaction {cseq} timed out after {after:?}")]
    Timeout {
        /// The `CSeq` value of the request
        cseq: String,
        /// How long the layer waited
        after: Duration,
    },

    /// A request with the same `CSeq` is still waiting for its response
    #[error("A transaction with CSeq {0} is already pending")]
    DuplicateTransaction(String),

    /// A response was handed to [`TransactionLayer::request`](crate::TransactionLayer::request)
    #[error("Not a request: {0}")]
    NotARequest(String),

    /// Outbound requests must carry a `CSeq` to be correlated
    #[error("Request has no CSeq header")]
    MissingCSeq,

    /// The connection went away before a response arrived
    #[error("Transport closed")]
    TransportClosed,

    /// The transport failed to write the message
    #[error("Transport error: {0}")]
    Transport(#[from] wsphone_sip_transport::Error),
}

impl TransactionError {
    /// Returns true for [`TransactionError::Timeout`]
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransactionError::Timeout { .. })
    }
}

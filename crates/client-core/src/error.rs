//! Error types for the client core

use std::time::Duration;

use thiserror::Error;

use crate::control::ControlError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that end a call agent run
#[derive(Debug, Error)]
pub enum ClientError {
    /// The registrar answered REGISTER with a non-2xx final response
    #[error("Registration failed with status {status}")]
    RegistrationFailed { status: u16 },

    /// The registrar challenged the credentialed REGISTER again
    #[error("Registration challenged again after authenticating")]
    AuthenticationLoop,

    /// A challenge header carried no `nonce` parameter
    #[error("Authentication challenge without nonce: {challenge}")]
    MissingNonce { challenge: String },

    /// Request/response exchange failed
    #[error("Transaction error: {0}")]
    Transaction(#[from] wsphone_transaction_core::TransactionError),

    /// The WebSocket connection could not be opened
    #[error("Transport error: {0}")]
    Transport(#[from] wsphone_sip_transport::Error),

    /// The embedded control message could not be decoded or encoded
    #[error("Control message error: {0}")]
    Control(#[from] ControlError),

    /// The INVITE carried no `P-rc` control header
    #[error("INVITE has no P-rc control header")]
    MissingControlHeader,

    /// The media bridge failed
    #[error("Media error: {message}")]
    Media { message: String },

    /// The media bridge did not produce an answer in time
    #[error("Media answer not ready after {after:?}")]
    MediaTimeout { after: Duration },

    /// Provisioning did not yield usable SIP credentials
    #[error("Provisioning error: {message}")]
    Provisioning { message: String },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Writing the call recording failed
    #[error("Recording error: {0}")]
    Recording(#[from] std::io::Error),
}

impl ClientError {
    /// Create a media error
    pub fn media(message: impl Into<String>) -> Self {
        Self::Media {
            message: message.into(),
        }
    }

    /// Create a provisioning error
    pub fn provisioning(message: impl Into<String>) -> Self {
        Self::Provisioning {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

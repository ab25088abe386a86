//! Error types for SIP message handling

use thiserror::Error;

/// Result type for SIP message operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing or building SIP messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The raw text had no subject line
    #[error("Empty SIP message")]
    EmptyMessage,

    /// No blank line separates the header block from the body
    #[error("Missing blank line between headers and body")]
    MissingSeparator,

    /// A header line did not contain a `:` separator
    #[error("Invalid header line: {0}")]
    InvalidHeader(String),

    /// A status line could not be split into version, code and reason
    #[error("Invalid status line: {0}")]
    InvalidStatusLine(String),

    /// The numeric status code has no entry in the reason phrase table
    #[error("Unknown status code: {0}")]
    UnknownStatusCode(u16),
}

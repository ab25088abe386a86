//! SIP message model for the wsphone stack
//!
//! This crate keeps SIP messages in their textual shape: a subject line, an
//! ordered header block and a body. Remote gateways reached over WebSocket are
//! not guaranteed to be lenient, so parsing and serialization preserve header
//! order and name casing exactly.
//!
//! - [`Message`] / [`parse_message`]: the message model and its wire grammar
//! - [`StatusCode`]: status code → reason phrase table
//! - [`builder`]: outbound request and response construction
//! - [`auth`]: client-side digest authentication

pub mod auth;
pub mod builder;
pub mod error;
pub mod message;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use message::{Message, RESPONSE_PREFIX};
pub use parser::parse_message;
pub use types::{names, Headers, StatusCode};

/// Protocol version token used in request and status lines
pub const SIP_VERSION: &str = "SIP/2.0";

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::auth::{extract_nonce, DigestCredentials};
    pub use crate::builder::{SimpleRequestBuilder, SimpleResponseBuilder};
    pub use crate::{names, parse_message, Error, Headers, Message, Result, StatusCode};
}

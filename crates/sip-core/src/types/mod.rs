//! Core SIP value types

pub mod headers;
pub mod status;

pub use headers::{names, Headers};
pub use status::{StatusCode, ALL_STATUS_CODES};

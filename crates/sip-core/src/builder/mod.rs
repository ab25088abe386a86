//! Builders for outbound SIP messages
//!
//! - [`SimpleRequestBuilder`] turns a request line and a header map into a
//!   request, adding `Max-Forwards`, `User-Agent` and `Content-Length`.
//! - [`SimpleResponseBuilder`] derives a response from a received request:
//!   `Via`, `From`, `Call-ID` and `CSeq` are copied verbatim, `To` gets the
//!   dialog tag, and caller-supplied headers override anything derived.

mod request;
mod response;

pub use request::SimpleRequestBuilder;
pub use response::SimpleResponseBuilder;

/// Default `Max-Forwards` value for outbound requests
pub const DEFAULT_MAX_FORWARDS: u32 = 70;

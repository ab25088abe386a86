//! Wire text → [`Message`] parser
//!
//! The grammar is deliberately small: the first CRLFCRLF splits the head from
//! the body, the first head line is the subject, and every further head line
//! is split on its first `:`. Header values keep any `:` they contain (URIs,
//! SDP-ish payloads) and repeated headers are preserved in order.

use tracing::trace;

use crate::error::{Error, Result};
use crate::message::Message;
use crate::types::Headers;

const CRLF: &str = "\r\n";
const HEAD_TERMINATOR: &str = "\r\n\r\n";

/// Parses one complete SIP message from its wire text
///
/// # Errors
///
/// - [`Error::EmptyMessage`] if the subject line is empty
/// - [`Error::MissingSeparator`] if there is no blank line after the headers
/// - [`Error::InvalidHeader`] if a header line has no `:`
///
/// # Examples
///
/// ```rust
/// use wsphone_sip_core::parse_message;
///
/// let msg = parse_message("BYE sip:a@b.invalid SIP/2.0\r\nCSeq: 2 BYE\r\n\r\n").unwrap();
/// assert_eq!(msg.method(), Some("BYE"));
/// assert_eq!(msg.body, "");
///
/// assert!(parse_message("BYE sip:a@b.invalid SIP/2.0\r\nCSeq: 2 BYE").is_err());
/// ```
pub fn parse_message(raw: &str) -> Result<Message> {
    let (head, body) = raw.split_once(HEAD_TERMINATOR).ok_or_else(|| {
        // A message without headers is just "subject\r\n\r\n"; anything that
        // never reaches a blank line is truncated.
        if raw.trim().is_empty() {
            Error::EmptyMessage
        } else {
            Error::MissingSeparator
        }
    })?;

    let mut lines = head.split(CRLF);
    let subject = lines.next().unwrap_or_default();
    if subject.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    let mut headers = Headers::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::InvalidHeader(line.to_string()))?;
        headers.append(name.trim(), value.trim());
    }

    trace!("Parsed SIP message '{}' with {} headers", subject, headers.len());

    Ok(Message {
        subject: subject.to_string(),
        headers,
        body: body.to_string(),
    })
}

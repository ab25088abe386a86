//! # SIP Message
//!
//! A SIP message is a line-oriented text unit: a subject line (request-line or
//! status-line), a block of `Name: value` headers, a blank line and an optional
//! body. The same structure is used for requests and responses; the subject
//! tells them apart, since every response subject starts with `SIP/2.0 `.
//!
//! ```text
//! SIP/2.0 180 Ringing
//! Via: SIP/2.0/WSS 7a9c.invalid;branch=z9hG4bK0f3b
//! From: <sip:+16501234567@sip.example.com>;tag=10.13.121.11-5060-a
//! To: <sip:101@sip.example.com>;tag=54e7
//! Call-ID: 1e7a8c45-17a4
//! CSeq: 1 INVITE
//! Content-Length: 0
//!
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use wsphone_sip_core::{parse_message, Message};
//!
//! let raw = "SIP/2.0 200 OK\r\nCSeq: 8145 REGISTER\r\nContent-Length: 0\r\n\r\n";
//! let message = parse_message(raw).unwrap();
//!
//! assert!(message.is_response());
//! assert_eq!(message.status_code(), Some(200));
//! assert_eq!(message.cseq(), Some("8145 REGISTER"));
//! assert_eq!(message.to_string(), raw);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::parser::parse_message;
use crate::types::{names, Headers};

/// Prefix shared by every response subject line
pub const RESPONSE_PREFIX: &str = "SIP/2.0 ";

/// A SIP request or response, kept in its textual shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Request-line or status-line, without the trailing CRLF
    pub subject: String,
    /// Headers in wire order
    pub headers: Headers,
    /// Message body, possibly empty
    pub body: String,
}

impl Message {
    /// Creates a message from its three parts
    pub fn new(subject: impl Into<String>, headers: Headers, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            headers,
            body: body.into(),
        }
    }

    /// Returns true if the subject is a status line
    pub fn is_response(&self) -> bool {
        self.subject.starts_with(RESPONSE_PREFIX)
    }

    /// Returns true if the subject is a request line
    pub fn is_request(&self) -> bool {
        !self.is_response()
    }

    /// Returns the method of a request (`INVITE`, `BYE`, ...)
    pub fn method(&self) -> Option<&str> {
        if self.is_response() {
            return None;
        }
        self.subject.split_whitespace().next()
    }

    /// Returns the request URI of a request
    pub fn request_uri(&self) -> Option<&str> {
        if self.is_response() {
            return None;
        }
        self.subject.split_whitespace().nth(1)
    }

    /// Returns the numeric status of a response
    pub fn status_code(&self) -> Option<u16> {
        if !self.is_response() {
            return None;
        }
        self.subject[RESPONSE_PREFIX.len()..]
            .split_whitespace()
            .next()
            .and_then(|code| code.parse().ok())
    }

    /// Returns true for a `100 Trying` provisional response
    pub fn is_trying(&self) -> bool {
        self.status_code() == Some(100)
    }

    /// Looks up a header value by name, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn cseq(&self) -> Option<&str> {
        self.header(names::CSEQ)
    }

    pub fn call_id(&self) -> Option<&str> {
        self.header(names::CALL_ID)
    }

    /// Serializes the message to its wire form
    pub fn to_wire(&self) -> String {
        let mut out = String::with_capacity(self.subject.len() + self.body.len() + 256);
        out.push_str(&self.subject);
        out.push_str("\r\n");
        for (name, value) in self.headers.iter() {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.push_str(&self.body);
        out
    }

    /// Short description for log lines: the subject plus the CSeq
    pub fn summary(&self) -> String {
        match self.cseq() {
            Some(cseq) => format!("{} [{}]", self.subject, cseq),
            None => self.subject.clone(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl FromStr for Message {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_message(s)
    }
}

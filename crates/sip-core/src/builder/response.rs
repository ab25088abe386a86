use crate::message::Message;
use crate::types::{names, Headers, StatusCode};

/// Builder for responses to a received request
///
/// The derived headers are, in order: `Via`, `From`, `To` (with the dialog
/// tag appended), `Call-ID`, `CSeq` and `Supported: outbound`. Headers added
/// through [`header`](Self::header) override derived ones in place, or are
/// appended when new. `Content-Length` is always computed from the body.
///
/// # Examples
///
/// ```rust
/// use wsphone_sip_core::{parse_message, StatusCode};
/// use wsphone_sip_core::builder::SimpleResponseBuilder;
///
/// let invite = parse_message(
///     "INVITE sip:x@y.invalid SIP/2.0\r\n\
///      Via: SIP/2.0/WSS 1.2.3.4;branch=z9hG4bK9\r\n\
///      From: <sip:caller@sip.example.com>;tag=abc\r\n\
///      To: <sip:callee@sip.example.com>\r\n\
///      Call-ID: c1\r\n\
///      CSeq: 1 INVITE\r\n\r\n",
/// ).unwrap();
///
/// let ringing = SimpleResponseBuilder::new(&invite, StatusCode::Ringing)
///     .to_tag("d2f1")
///     .build();
///
/// assert_eq!(ringing.subject, "SIP/2.0 180 Ringing");
/// assert_eq!(ringing.header("To"), Some("<sip:callee@sip.example.com>;tag=d2f1"));
/// assert_eq!(ringing.header("CSeq"), Some("1 INVITE"));
/// ```
#[derive(Debug, Clone)]
pub struct SimpleResponseBuilder<'a> {
    request: &'a Message,
    status: StatusCode,
    to_tag: Option<String>,
    overrides: Headers,
    body: String,
    user_agent: Option<String>,
}

impl<'a> SimpleResponseBuilder<'a> {
    /// Starts a response with `status` to `request`
    pub fn new(request: &'a Message, status: StatusCode) -> Self {
        Self {
            request,
            status,
            to_tag: None,
            overrides: Headers::new(),
            body: String::new(),
            user_agent: None,
        }
    }

    /// Sets the local dialog tag appended to the request's `To` header
    pub fn to_tag(mut self, tag: impl Into<String>) -> Self {
        self.to_tag = Some(tag.into());
        self
    }

    /// Adds a header that overrides any derived header of the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name, value);
        self
    }

    /// Sets the body together with its `Content-Type`
    pub fn body(mut self, content_type: &str, body: impl Into<String>) -> Self {
        self.overrides.insert(names::CONTENT_TYPE, content_type);
        self.body = body.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the response
    pub fn build(self) -> Message {
        let mut headers = Headers::new();
        self.inherit(&mut headers, names::VIA);
        self.inherit(&mut headers, names::FROM);

        let to = self.request.header(names::TO).unwrap_or_default();
        let to = match &self.to_tag {
            Some(tag) => format!("{};tag={}", to, tag),
            None => to.to_string(),
        };
        headers.insert(names::TO, to);

        self.inherit(&mut headers, names::CALL_ID);
        self.inherit(&mut headers, names::CSEQ);
        headers.insert(names::SUPPORTED, "outbound");

        headers.merge(&self.overrides);

        if let Some(user_agent) = self.user_agent {
            if !headers.contains(names::USER_AGENT) {
                headers.insert(names::USER_AGENT, user_agent);
            }
        }
        headers.insert(names::CONTENT_LENGTH, self.body.len().to_string());

        Message::new(self.status.status_line(), headers, self.body)
    }

    // Copies a header verbatim; the peer matches its transaction on these
    fn inherit(&self, headers: &mut Headers, name: &str) {
        if let Some(value) = self.request.header(name) {
            headers.insert(name, value);
        }
    }
}

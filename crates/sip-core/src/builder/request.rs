use crate::builder::DEFAULT_MAX_FORWARDS;
use crate::message::Message;
use crate::types::{names, Headers};
use crate::SIP_VERSION;

/// Builder for outbound SIP requests
///
/// Headers are emitted in the order they are added. `Max-Forwards` and
/// `User-Agent` are appended only when the caller did not set them;
/// `Content-Length` is always computed from the body.
///
/// # Examples
///
/// ```rust
/// use wsphone_sip_core::builder::SimpleRequestBuilder;
///
/// let request = SimpleRequestBuilder::new("REGISTER", "sip:sip.example.com")
///     .header("CSeq", "8145 REGISTER")
///     .header("Call-ID", "6f1c")
///     .user_agent("wsphone/0.1.0")
///     .build();
///
/// assert_eq!(request.subject, "REGISTER sip:sip.example.com SIP/2.0");
/// assert_eq!(request.header("Max-Forwards"), Some("70"));
/// assert_eq!(request.header("Content-Length"), Some("0"));
/// ```
#[derive(Debug, Clone)]
pub struct SimpleRequestBuilder {
    request_line: String,
    headers: Headers,
    body: String,
    user_agent: Option<String>,
}

impl SimpleRequestBuilder {
    /// Starts a request for `method` addressed to `uri`
    pub fn new(method: &str, uri: &str) -> Self {
        Self::from_request_line(format!("{} {} {}", method, uri, SIP_VERSION))
    }

    /// Starts a request from a preformatted request line
    pub fn from_request_line(request_line: impl Into<String>) -> Self {
        Self {
            request_line: request_line.into(),
            headers: Headers::new(),
            body: String::new(),
            user_agent: None,
        }
    }

    /// Adds or replaces a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds every header of `headers`, in order
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.merge(headers);
        self
    }

    /// Sets the body together with its `Content-Type`
    pub fn body(mut self, content_type: &str, body: impl Into<String>) -> Self {
        self.headers.insert(names::CONTENT_TYPE, content_type);
        self.body = body.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the request
    pub fn build(self) -> Message {
        let mut headers = self.headers;
        if !headers.contains(names::MAX_FORWARDS) {
            headers.insert(names::MAX_FORWARDS, DEFAULT_MAX_FORWARDS.to_string());
        }
        if let Some(user_agent) = self.user_agent {
            if !headers.contains(names::USER_AGENT) {
                headers.insert(names::USER_AGENT, user_agent);
            }
        }
        headers.insert(names::CONTENT_LENGTH, self.body.len().to_string());

        Message::new(self.request_line, headers, self.body)
    }
}

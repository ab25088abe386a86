//! Ordered SIP header collection
//!
//! Remote endpoints are not guaranteed to be lenient about header order or the
//! casing of header names, so [`Headers`] stores every entry exactly as given
//! and serializes in insertion order. Lookups, on the other hand, follow
//! RFC 3261 and compare names case-insensitively.
//!
//! ```rust
//! use wsphone_sip_core::Headers;
//!
//! let mut headers = Headers::new();
//! headers.insert("Via", "SIP/2.0/WSS abc.invalid;branch=z9hG4bK1");
//! headers.insert("CSeq", "8145 REGISTER");
//! headers.insert("Via", "SIP/2.0/WSS abc.invalid;branch=z9hG4bK2");
//!
//! assert_eq!(headers.get("cseq"), Some("8145 REGISTER"));
//! assert_eq!(headers.len(), 2);
//! assert_eq!(headers.iter().next(), Some(("Via", "SIP/2.0/WSS abc.invalid;branch=z9hG4bK2")));
//! ```

/// Well-known header names, spelled the way this stack emits them
pub mod names {
    pub const VIA: &str = "Via";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const CALL_ID: &str = "Call-ID";
    pub const CSEQ: &str = "CSeq";
    pub const CONTACT: &str = "Contact";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const MAX_FORWARDS: &str = "Max-Forwards";
    pub const USER_AGENT: &str = "User-Agent";
    pub const SUPPORTED: &str = "Supported";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const WWW_AUTHENTICATE: &str = "Www-Authenticate";
    pub const PROXY_AUTHENTICATE: &str = "Proxy-Authenticate";
    pub const PROXY_AUTHORIZATION: &str = "Proxy-Authorization";
}

/// Insertion-ordered header map with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the first header named `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Returns true if a header named `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sets a header, replacing an existing one of the same name in place
    ///
    /// A replaced header keeps its position; the name is updated to the casing
    /// supplied here. New names are appended at the end.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Appends a header without looking for an existing one
    ///
    /// Used by the parser so repeated headers on the wire survive untouched.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Iterates over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies every header of `other` on top of this collection
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

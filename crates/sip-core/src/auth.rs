//! # SIP Digest Authentication
//!
//! Client side of the RFC 2617 digest scheme (without `qop`), as used by
//! registrars answering `REGISTER` with `401 Unauthorized`:
//!
//! ```text
//! HA1      = MD5(username ":" realm ":" password)
//! HA2      = MD5(method ":" uri)
//! response = MD5(HA1 ":" nonce ":" HA2)
//! ```
//!
//! All hashes are rendered as lowercase hex before being joined, so the
//! result matches the server's verification bit for bit.
//!
//! ## Examples
//!
//! ```rust
//! use wsphone_sip_core::auth::{extract_nonce, DigestCredentials};
//!
//! let challenge = r#"Digest realm="sip.example.com", nonce="abc123", algorithm=MD5"#;
//! let nonce = extract_nonce(challenge).unwrap();
//!
//! let credentials = DigestCredentials::new("alice-auth", "s3cret", "sip.example.com");
//! let header = credentials.authorization("REGISTER", "sip:sip.example.com", &nonce);
//!
//! assert!(header.starts_with("Digest algorithm=MD5, username=\"alice-auth\""));
//! assert!(header.ends_with("response=\"7711a1114928e8d96a796596c92fbd3a\""));
//! ```

use tracing::debug;

/// Hex-encoded MD5 of `data`
fn md5_hex(data: &str) -> String {
    format!("{:x}", md5::compute(data.as_bytes()))
}

/// Computes the digest `response` value
pub fn digest_response(
    username: &str,
    password: &str,
    realm: &str,
    method: &str,
    uri: &str,
    nonce: &str,
) -> String {
    let ha1 = md5_hex(&format!("{}:{}:{}", username, realm, password));
    let ha2 = md5_hex(&format!("{}:{}", method, uri));
    md5_hex(&format!("{}:{}:{}", ha1, nonce, ha2))
}

/// Extracts a quoted parameter (`name="value"`) from a challenge header
///
/// The name must start the header or follow a space or comma, so looking up
/// `nonce` never matches `cnonce`.
pub fn extract_auth_param(header: &str, param: &str) -> Option<String> {
    let prefix = format!("{}=\"", param);
    let mut search_from = 0;

    while let Some(found) = header[search_from..].find(&prefix) {
        let start = search_from + found;
        let boundary_ok = header[..start]
            .chars()
            .next_back()
            .map_or(true, |c| c == ' ' || c == ',' || c == '\t');

        let value_start = start + prefix.len();
        if boundary_ok {
            let end = header[value_start..].find('"')?;
            return Some(header[value_start..value_start + end].to_string());
        }
        search_from = value_start;
    }

    None
}

/// Extracts the `nonce` from a `WWW-Authenticate` / `Proxy-Authenticate` value
pub fn extract_nonce(header: &str) -> Option<String> {
    extract_auth_param(header, "nonce")
}

/// Account secret plus the realm it is valid for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestCredentials {
    pub username: String,
    pub password: String,
    pub realm: String,
}

impl DigestCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            realm: realm.into(),
        }
    }

    /// Computes the digest `response` for `method` on `uri`
    pub fn response(&self, method: &str, uri: &str, nonce: &str) -> String {
        digest_response(&self.username, &self.password, &self.realm, method, uri, nonce)
    }

    /// Builds the full `Authorization` header value
    pub fn authorization(&self, method: &str, uri: &str, nonce: &str) -> String {
        debug!("Computing digest credentials for {} {} (realm {})", method, uri, self.realm);
        format!(
            "Digest algorithm=MD5, username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response=\"{}\"",
            self.username,
            self.realm,
            nonce,
            uri,
            self.response(method, uri, nonce),
        )
    }
}

//! Per-session identifiers shared by every message of the dialog

use uuid::Uuid;

/// First CSeq number used by the session
pub const INITIAL_CSEQ: u32 = 8145;

/// RFC 3261 magic cookie every branch parameter starts with
pub const BRANCH_MAGIC_COOKIE: &str = "z9hG4bK";

/// Identifiers generated once per session and used for every message
///
/// The endpoint has no routable address of its own, so its contact is a
/// random name under the reserved `.invalid` top-level domain; the gateway
/// routes back over the WebSocket connection regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogContext {
    /// `<uuid>.invalid`
    pub pseudo_domain: String,
    /// `<uuid>@<pseudo_domain>`
    pub pseudo_address: String,
    /// Tag on the `From` header of every request we send
    pub from_tag: String,
    /// Tag added to the `To` header of every response we send
    pub to_tag: String,
    /// `Call-ID` of every request we send
    pub call_id: String,
    cseq: u32,
}

impl DialogContext {
    pub fn new() -> Self {
        let pseudo_domain = format!("{}.invalid", Uuid::new_v4());
        let pseudo_address = format!("{}@{}", Uuid::new_v4(), pseudo_domain);
        Self {
            pseudo_domain,
            pseudo_address,
            from_tag: Uuid::new_v4().to_string(),
            to_tag: Uuid::new_v4().to_string(),
            call_id: Uuid::new_v4().to_string(),
            cseq: INITIAL_CSEQ,
        }
    }

    /// Returns the next `CSeq` header value for `method`
    pub fn next_cseq(&mut self, method: &str) -> String {
        let value = format!("{} {}", self.cseq, method);
        self.cseq += 1;
        value
    }

    /// Returns a fresh `Via` branch parameter
    pub fn branch(&self) -> String {
        format!("{}{}", BRANCH_MAGIC_COOKIE, Uuid::new_v4())
    }

    /// `Contact` value advertising the pseudo-address
    pub fn contact(&self) -> String {
        format!("<sip:{};transport=ws>", self.pseudo_address)
    }

    /// `Contact` value advertising the bare pseudo-domain
    pub fn domain_contact(&self) -> String {
        format!("<sip:{};transport=ws>", self.pseudo_domain)
    }
}

impl Default for DialogContext {
    fn default() -> Self {
        Self::new()
    }
}

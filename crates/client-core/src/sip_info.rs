//! SIP credentials and endpoints handed out by the platform's provisioning API

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// One SIP account record
///
/// Deserializes from the provisioning JSON, either the full document
/// (`{"sipInfo":[{...}]}`) through [`SipInfo::from_json`] or a bare record.
/// Unknown fields such as `transport` or `certificate` are ignored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipInfo {
    /// SIP domain, also the digest realm
    pub domain: String,
    /// User part of the address of record
    pub username: String,
    /// Digest username
    pub authorization_id: String,
    /// `host[:port]` of the WebSocket gateway
    pub outbound_proxy: String,
    /// Digest password
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProvisioningDocument {
    Envelope {
        #[serde(rename = "sipInfo")]
        sip_info: Vec<SipInfo>,
    },
    Record(SipInfo),
}

impl SipInfo {
    /// Parses a provisioning response, taking the first record
    pub fn from_json(json: &str) -> ClientResult<Self> {
        let document: ProvisioningDocument = serde_json::from_str(json)
            .map_err(|e| ClientError::provisioning(format!("Invalid provisioning JSON: {}", e)))?;

        let sip_info = match document {
            ProvisioningDocument::Envelope { sip_info } => sip_info
                .into_iter()
                .next()
                .ok_or_else(|| ClientError::provisioning("Provisioning document has no sipInfo record"))?,
            ProvisioningDocument::Record(sip_info) => sip_info,
        };

        sip_info.validate()?;
        Ok(sip_info)
    }

    /// Checks that every field needed to register is present
    pub fn validate(&self) -> ClientResult<()> {
        let required = [
            ("domain", &self.domain),
            ("username", &self.username),
            ("authorizationId", &self.authorization_id),
            ("outboundProxy", &self.outbound_proxy),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ClientError::config(format!("SIP info field '{}' is empty", name)));
            }
        }
        Ok(())
    }

    /// Address of record: `<user>@<domain>`
    pub fn address(&self) -> String {
        format!("{}@{}", self.username, self.domain)
    }

    /// Registrar URI: `sip:<domain>`
    pub fn registrar_uri(&self) -> String {
        format!("sip:{}", self.domain)
    }
}

// Keeps the password out of logs
impl fmt::Debug for SipInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SipInfo")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("authorization_id", &self.authorization_id)
            .field("outbound_proxy", &self.outbound_proxy)
            .field("password", &"<redacted>")
            .finish()
    }
}

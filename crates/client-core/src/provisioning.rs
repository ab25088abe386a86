//! Sources of [`SipInfo`]
//!
//! The platform hands out SIP credentials through an authenticated REST call.
//! That bootstrap lives outside this crate; anything able to produce a
//! [`SipInfo`] plugs in through [`Provisioner`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::sip_info::SipInfo;

/// Produces the SIP account to register with
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn provision(&self) -> ClientResult<SipInfo>;
}

/// Hands out a record known up front (command line, environment)
#[derive(Debug, Clone)]
pub struct StaticProvisioner {
    sip_info: SipInfo,
}

impl StaticProvisioner {
    pub fn new(sip_info: SipInfo) -> Self {
        Self { sip_info }
    }
}

#[async_trait]
impl Provisioner for StaticProvisioner {
    async fn provision(&self) -> ClientResult<SipInfo> {
        self.sip_info.validate()?;
        Ok(self.sip_info.clone())
    }
}

/// Reads a saved provisioning response from disk
#[derive(Debug, Clone)]
pub struct JsonFileProvisioner {
    path: PathBuf,
}

impl JsonFileProvisioner {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Provisioner for JsonFileProvisioner {
    async fn provision(&self) -> ClientResult<SipInfo> {
        debug!("Reading SIP info from {}", self.path.display());
        let json = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ClientError::provisioning(format!("Cannot read {}: {}", self.path.display(), e))
        })?;

        let sip_info = SipInfo::from_json(&json)?;
        info!(
            "Provisioned {} via {}",
            sip_info.address(),
            sip_info.outbound_proxy
        );
        Ok(sip_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sip_info() -> SipInfo {
        SipInfo {
            domain: "sip.example.com".to_string(),
            username: "101".to_string(),
            authorization_id: "a101".to_string(),
            outbound_proxy: "sip123.example.com:8083".to_string(),
            password: "pw".to_string(),
        }
    }

    #[tokio::test]
    async fn test_static_provisioner() {
        let provisioner = StaticProvisioner::new(sip_info());
        assert_eq!(provisioner.provision().await.unwrap(), sip_info());
    }

    #[tokio::test]
    async fn test_json_file_provisioner() {
        let path = std::env::temp_dir().join(format!("wsphone-sipinfo-{}.json", uuid::Uuid::new_v4()));
        let json = serde_json::json!({ "sipInfo": [sip_info()] }).to_string();
        tokio::fs::write(&path, json).await.unwrap();

        let provisioned = JsonFileProvisioner::new(&path).provision().await.unwrap();
        assert_eq!(provisioned, sip_info());

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let provisioner = JsonFileProvisioner::new("/nonexistent/wsphone/sip-info.json");
        let result = provisioner.provision().await;
        assert!(matches!(result, Err(ClientError::Provisioning { .. })));
    }
}

//! Client configuration
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use wsphone_client_core::ClientConfig;
//!
//! let config = ClientConfig::new()
//!     .with_transaction_timeout(Duration::from_secs(10))
//!     .with_recording_path("call.raw")
//!     .with_acknowledge_bye(true);
//!
//! assert_eq!(config.transaction_timeout(), Duration::from_secs(10));
//! assert_eq!(config.media_timeout(), Duration::from_secs(10));
//! assert_eq!(config.register_expires, 600);
//! assert!(config.acknowledge_bye);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// STUN server offered to the media bridge by default
pub const DEFAULT_STUN_SERVER: &str = "stun:74.125.194.127:19302";

/// Default name of the raw audio recording
pub const DEFAULT_RECORDING_PATH: &str = "audio.raw";

/// Settings of a call agent
///
/// Every field has a default, so a JSON file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Bound on each request/response exchange, in milliseconds
    pub transaction_timeout_ms: u64,
    /// Bound on answer generation by the media bridge, in milliseconds
    pub media_timeout_ms: u64,
    /// `expires` parameter of the REGISTER contact
    pub register_expires: u32,
    /// ICE servers handed to the media bridge
    pub ice_servers: Vec<String>,
    /// Where received audio samples are written
    pub recording_path: PathBuf,
    /// `User-Agent` of every outbound message
    pub user_agent: String,
    /// Whether to answer BYE with 200 OK
    pub acknowledge_bye: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transaction_timeout_ms: 32_000,
            media_timeout_ms: 10_000,
            register_expires: 600,
            ice_servers: vec![DEFAULT_STUN_SERVER.to_string()],
            recording_path: PathBuf::from(DEFAULT_RECORDING_PATH),
            user_agent: format!("wsphone/{}", env!("CARGO_PKG_VERSION")),
            acknowledge_bye: false,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration, filling absent fields with defaults
    pub fn from_json(json: &str) -> ClientResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ClientError::config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero timeouts and an empty user agent
    pub fn validate(&self) -> ClientResult<()> {
        if self.transaction_timeout_ms == 0 {
            return Err(ClientError::config("transaction_timeout_ms must be positive"));
        }
        if self.media_timeout_ms == 0 {
            return Err(ClientError::config("media_timeout_ms must be positive"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ClientError::config("user_agent must not be empty"));
        }
        Ok(())
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }

    pub fn media_timeout(&self) -> Duration {
        Duration::from_millis(self.media_timeout_ms)
    }

    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout_ms = duration_ms(timeout);
        self
    }

    pub fn with_media_timeout(mut self, timeout: Duration) -> Self {
        self.media_timeout_ms = duration_ms(timeout);
        self
    }

    pub fn with_register_expires(mut self, expires: u32) -> Self {
        self.register_expires = expires;
        self
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<String>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    pub fn with_recording_path(mut self, path: impl AsRef<Path>) -> Self {
        self.recording_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_acknowledge_bye(mut self, acknowledge: bool) -> Self {
        self.acknowledge_bye = acknowledge;
        self
    }
}

// Whole milliseconds, rounding a sub-millisecond remainder up
fn duration_ms(duration: Duration) -> u64 {
    let millis = duration.as_millis() + u128::from(duration.subsec_nanos() % 1_000_000 != 0);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

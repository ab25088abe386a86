//! `wsphone`: registers with a SIP-over-WebSocket gateway, answers one
//! inbound call and waits for the remote party to hang up.

mod bridge;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use wsphone_client_core::{
    CallAgent, ClientConfig, JsonFileProvisioner, MediaBridge, Provisioner, SipInfo,
    StaticProvisioner,
};

use crate::bridge::StaticAnswerBridge;
use crate::logging::{log_welcome, parse_log_level, setup_logging, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "wsphone", version)]
#[command(about = "Registers a SIP-over-WebSocket endpoint and answers one inbound call")]
struct Cli {
    /// Provisioning JSON saved from the platform (`{"sipInfo":[...]}`)
    #[arg(long, env = "WSPHONE_SIP_INFO")]
    sip_info: Option<PathBuf>,

    /// SIP domain, also the digest realm
    #[arg(long, env = "WSPHONE_DOMAIN")]
    domain: Option<String>,

    /// User part of the address of record
    #[arg(long, env = "WSPHONE_USERNAME")]
    username: Option<String>,

    /// Digest username
    #[arg(long, env = "WSPHONE_AUTHORIZATION_ID")]
    authorization_id: Option<String>,

    /// WebSocket gateway, `host[:port]` or a full ws(s):// URL
    #[arg(long, env = "WSPHONE_OUTBOUND_PROXY")]
    outbound_proxy: Option<String>,

    /// Digest password
    #[arg(long, env = "WSPHONE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Client configuration JSON; absent fields keep their defaults
    #[arg(long, env = "WSPHONE_CONFIG")]
    config: Option<PathBuf>,

    /// SDP answer sent back for the inbound offer
    #[arg(long, env = "WSPHONE_ANSWER_SDP")]
    answer_sdp: PathBuf,

    /// Where received audio is written (overrides the configuration)
    #[arg(long, env = "WSPHONE_RECORDING")]
    recording: Option<PathBuf>,

    /// Answer BYE with 200 OK
    #[arg(long, env = "WSPHONE_ACKNOWLEDGE_BYE")]
    acknowledge_bye: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "WSPHONE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Include source file and line in log lines
    #[arg(long)]
    log_file_info: bool,
}

impl Cli {
    fn provisioner(&self) -> Result<Box<dyn Provisioner>> {
        if let Some(path) = &self.sip_info {
            return Ok(Box::new(JsonFileProvisioner::new(path)));
        }

        let (Some(domain), Some(username), Some(authorization_id), Some(outbound_proxy)) = (
            &self.domain,
            &self.username,
            &self.authorization_id,
            &self.outbound_proxy,
        ) else {
            bail!(
                "Either --sip-info or all of --domain, --username, --authorization-id and --outbound-proxy are required"
            );
        };

        Ok(Box::new(StaticProvisioner::new(SipInfo {
            domain: domain.clone(),
            username: username.clone(),
            authorization_id: authorization_id.clone(),
            outbound_proxy: outbound_proxy.clone(),
            password: self.password.clone().unwrap_or_default(),
        })))
    }

    async fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Cannot read configuration {}", path.display()))?;
                ClientConfig::from_json(&json)
                    .with_context(|| format!("Invalid configuration {}", path.display()))?
            }
            None => ClientConfig::default(),
        };

        if let Some(recording) = &self.recording {
            config = config.with_recording_path(recording);
        }
        if self.acknowledge_bye {
            config = config.with_acknowledge_bye(true);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::new(parse_log_level(&cli.log_level)?, "wsphone");
    if cli.log_file_info {
        logging = logging.with_file_info();
    }
    setup_logging(&logging)?;
    log_welcome(&logging, env!("CARGO_PKG_VERSION"));

    let config = cli.client_config().await?;
    let sip_info = cli
        .provisioner()?
        .provision()
        .await
        .context("Provisioning failed")?;
    let bridge = Arc::new(StaticAnswerBridge::from_file(&cli.answer_sdp).await?);

    let agent = CallAgent::connect(sip_info, config, bridge.clone())
        .await
        .context("Cannot connect to the outbound proxy")?;

    tokio::select! {
        result = agent.run() => result.context("Call failed")?,
        _ = tokio::signal::ctrl_c() => warn!("Interrupted, leaving without hanging up"),
    }

    if !bridge.is_stopped() {
        bridge.stop().await.context("Cannot stop media")?;
    }

    info!("Done");
    Ok(())
}

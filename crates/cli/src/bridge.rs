use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use wsphone_client_core::{ClientResult, MediaBridge, MediaEvent};

/// Answers every offer with an SDP prepared ahead of time
///
/// No media flows through this bridge, so there is nothing to record. A real
/// media engine replaces it by implementing [`MediaBridge`].
#[derive(Debug)]
pub struct StaticAnswerBridge {
    answer: String,
    stopped: AtomicBool,
}

impl StaticAnswerBridge {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            stopped: AtomicBool::new(false),
        }
    }

    /// Loads the answer SDP from `path`
    pub async fn from_file(path: &Path) -> Result<Self> {
        let answer = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read answer SDP from {}", path.display()))?;
        Ok(Self::new(answer))
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaBridge for StaticAnswerBridge {
    async fn create_answer(&self, offer: &str, ice_servers: &[String]) -> ClientResult<String> {
        debug!(
            "Answering {} byte offer with static SDP (ICE servers {:?})",
            offer.len(),
            ice_servers
        );
        Ok(self.answer.clone())
    }

    fn take_events(&self) -> Option<mpsc::Receiver<MediaEvent>> {
        None
    }

    async fn stop(&self) -> ClientResult<()> {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            info!("Media session stopped");
        }
        Ok(())
    }
}

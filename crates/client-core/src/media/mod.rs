//! Seams to the media engine
//!
//! The agent never touches RTP itself. It hands the SDP offer to a
//! [`MediaBridge`], sends back whatever answer the bridge produces, and feeds
//! the bridge's [`MediaEvent`]s to a [`Recorder`].

mod recorder;

pub use recorder::Recorder;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};

/// Events emitted by a media session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// A remote audio track started; recording restarts from an empty file
    TrackAvailable,
    /// A batch of raw audio samples from the remote track
    Samples(Bytes),
}

/// Offer/answer negotiation and lifetime of the media session
#[async_trait]
pub trait MediaBridge: Send + Sync {
    /// Applies the remote offer and returns the local answer SDP
    async fn create_answer(&self, offer: &str, ice_servers: &[String]) -> ClientResult<String>;

    /// Hands out the event stream of the session, once
    fn take_events(&self) -> Option<mpsc::Receiver<MediaEvent>>;

    /// Stops the media session and releases its resources
    async fn stop(&self) -> ClientResult<()>;
}

/// A started media session and its recording, released at most once
pub(crate) struct MediaSession {
    bridge: Arc<dyn MediaBridge>,
    recorder: Option<Recorder>,
    released: bool,
}

impl MediaSession {
    pub(crate) fn start(bridge: Arc<dyn MediaBridge>, recording_path: &Path) -> Self {
        let recorder = bridge
            .take_events()
            .map(|events| Recorder::spawn(recording_path, events));
        Self {
            bridge,
            recorder,
            released: false,
        }
    }

    pub(crate) fn bridge(&self) -> &Arc<dyn MediaBridge> {
        &self.bridge
    }

    /// Stops the bridge and finishes the recording
    pub(crate) async fn release(&mut self) -> ClientResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let stopped = self.bridge.stop().await;
        if let Some(recorder) = self.recorder.take() {
            let written = recorder.finish().await?;
            info!("Recording finished, {} bytes written", written);
        }
        stopped
    }

    /// Releases the session on a failure path, keeping the original error
    pub(crate) async fn abandon(&mut self, reason: ClientError) -> ClientError {
        if let Err(e) = self.release().await {
            warn!("Failed to release media session: {}", e);
        }
        reason
    }
}

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::MediaEvent;
use crate::error::{ClientError, ClientResult};

/// Writes the raw samples of the remote track to a file
///
/// The file is (re)created when a track becomes available; samples arriving
/// before any track are dropped.
#[derive(Debug)]
pub struct Recorder {
    path: PathBuf,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<io::Result<u64>>,
}

impl Recorder {
    /// Starts consuming `events` in a background task
    pub fn spawn(path: impl AsRef<Path>, events: mpsc::Receiver<MediaEvent>) -> Self {
        let path = path.as_ref().to_path_buf();
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(record(path.clone(), events, stop_rx));
        Self {
            path,
            stop_tx: Some(stop_tx),
            handle,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes what is still queued, closes the file and returns the number
    /// of sample bytes in it
    pub async fn finish(mut self) -> ClientResult<u64> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        match self.handle.await {
            Ok(result) => Ok(result?),
            Err(e) => Err(ClientError::Recording(io::Error::other(e.to_string()))),
        }
    }
}

struct RecordingFile {
    path: PathBuf,
    file: Option<File>,
    written: u64,
}

impl RecordingFile {
    async fn handle(&mut self, event: MediaEvent) -> io::Result<()> {
        match event {
            MediaEvent::TrackAvailable => {
                if let Some(mut previous) = self.file.take() {
                    previous.flush().await?;
                }
                self.file = Some(File::create(&self.path).await?);
                self.written = 0;
                info!("Recording remote audio to {}", self.path.display());
            }
            MediaEvent::Samples(samples) => match self.file.as_mut() {
                Some(file) => {
                    file.write_all(&samples).await?;
                    self.written += samples.len() as u64;
                }
                None => debug!("Dropping {} bytes received before a track", samples.len()),
            },
        }
        Ok(())
    }

    async fn close(mut self) -> io::Result<u64> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        Ok(self.written)
    }
}

async fn record(
    path: PathBuf,
    mut events: mpsc::Receiver<MediaEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) -> io::Result<u64> {
    let mut recording = RecordingFile {
        path,
        file: None,
        written: 0,
    };

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            event = events.recv() => match event {
                Some(event) => recording.handle(event).await?,
                None => break,
            },
        }
    }

    while let Ok(event) = events.try_recv() {
        recording.handle(event).await?;
    }

    recording.close().await
}

use tracing::{debug, info};

use wsphone_sip_core::builder::SimpleResponseBuilder;
use wsphone_sip_core::{names, Message, StatusCode};

use super::CallAgent;
use crate::control::is_takeover;
use crate::error::ClientResult;
use crate::media::MediaSession;

impl CallAgent {
    /// Follows the established call until BYE
    ///
    /// A takeover notification is acknowledged once. The media session is
    /// released on every way out of this state.
    pub(super) async fn in_call(&mut self, mut media: MediaSession) -> ClientResult<()> {
        let ended = self.watch_call().await;
        let released = media.release().await;

        let bye = ended?;
        released?;

        if self.config.acknowledge_bye {
            self.acknowledge(&bye).await?;
        }
        Ok(())
    }

    // Returns the BYE that ended the call
    async fn watch_call(&mut self) -> ClientResult<Message> {
        let mut takeover_armed = true;

        loop {
            let message = self.next_inbound().await?;

            if message.subject.starts_with("BYE ") {
                info!("Remote party hung up");
                return Ok(message);
            }

            if takeover_armed && message.subject.starts_with("MESSAGE ") && is_takeover(&message.body) {
                info!("Call taken over by another party");
                self.acknowledge(&message).await?;
                takeover_armed = false;
                continue;
            }

            if message.subject.starts_with("INVITE ") {
                debug!("Ignoring additional INVITE {}", message.summary());
            } else {
                debug!("Ignoring {} during call", message.summary());
            }
        }
    }

    async fn acknowledge(&self, request: &Message) -> ClientResult<()> {
        let mut builder = SimpleResponseBuilder::new(request, StatusCode::Ok)
            .to_tag(self.dialog.to_tag.clone())
            .user_agent(self.config.user_agent.clone());
        // In-dialog requests already carry our tag
        if let Some(to) = request.header(names::TO).filter(|to| to.contains(";tag=")) {
            builder = builder.header(names::TO, to);
        }
        let ok = builder.build();
        self.layer.send(&ok).await?;
        Ok(())
    }
}

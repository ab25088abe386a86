use tracing::{debug, info, warn};

use wsphone_sip_core::builder::{SimpleRequestBuilder, SimpleResponseBuilder};
use wsphone_sip_core::{names, Message, StatusCode};

use super::{CallAgent, CallState};
use crate::control::{ControlMessage, CMD_ANSWER, CONTROL_CONTENT_TYPE, CONTROL_HEADER};
use crate::error::{ClientError, ClientResult};
use crate::media::MediaSession;

const SDP_CONTENT_TYPE: &str = "application/sdp";

impl CallAgent {
    /// Waits for the INVITE of the one call this agent answers
    pub(super) async fn wait_for_invite(&mut self) -> ClientResult<Message> {
        loop {
            let message = self.next_inbound().await?;
            if message.subject.starts_with("INVITE sip:") {
                info!(
                    "Incoming call {} for {}",
                    message.call_id().unwrap_or("<no Call-ID>"),
                    message.request_uri().unwrap_or_default()
                );
                return Ok(message);
            }
            debug!("Ignoring {} while waiting for INVITE", message.summary());
        }
    }

    /// Sends 100 Trying and 180 Ringing
    pub(super) async fn ring(&mut self, invite: &Message) -> ClientResult<()> {
        self.transition(CallState::Ringing);

        let trying = SimpleResponseBuilder::new(invite, StatusCode::Trying)
            .to_tag(self.dialog.to_tag.clone())
            .user_agent(self.config.user_agent.clone())
            .build();
        self.layer.send(&trying).await?;

        let ringing = SimpleResponseBuilder::new(invite, StatusCode::Ringing)
            .to_tag(self.dialog.to_tag.clone())
            .header(names::CONTACT, self.dialog.domain_contact())
            .user_agent(self.config.user_agent.clone())
            .build();
        self.layer.send(&ringing).await?;
        Ok(())
    }

    /// Tells the platform this endpoint takes the call
    pub(super) async fn send_control_reply(&mut self, invite: &Message) -> ClientResult<()> {
        let xml = invite
            .header(CONTROL_HEADER)
            .ok_or(ClientError::MissingControlHeader)?;
        let control = ControlMessage::from_xml(xml)?;
        debug!(
            "Control message {:?}, caller {}",
            control.header,
            control.body_value("Phn").unwrap_or("unknown")
        );

        let reply = control.reply(
            CMD_ANSWER,
            [("Cln", self.sip_info.authorization_id.as_str())],
        );
        let target = control.header.from.replace('#', "%23");

        let message = SimpleRequestBuilder::new("MESSAGE", &format!("sip:{}", target))
            .header(
                names::VIA,
                format!("SIP/2.0/WSS {};branch={}", self.dialog.pseudo_address, self.dialog.branch()),
            )
            .header(names::TO, format!("<sip:{}>", target))
            .header(
                names::FROM,
                format!(
                    "<sip:{}@{}>;tag={}",
                    control.header.to, self.sip_info.domain, self.dialog.from_tag
                ),
            )
            .header(names::CALL_ID, self.dialog.call_id.clone())
            .header(names::CSEQ, self.dialog.next_cseq("MESSAGE"))
            .body(CONTROL_CONTENT_TYPE, reply.to_xml()?)
            .user_agent(self.config.user_agent.clone())
            .build();

        let response = self.layer.request(&message).await?;
        match response.status_code() {
            Some(status) if (200..300).contains(&status) => {
                debug!("Control reply accepted with {}", response.subject)
            }
            _ => warn!("Control reply answered with {}", response.subject),
        }
        Ok(())
    }

    /// Negotiates media and accepts the call with 200 OK
    pub(super) async fn answer(&mut self, invite: &Message) -> ClientResult<MediaSession> {
        self.transition(CallState::Answering);

        let mut media = MediaSession::start(self.bridge.clone(), &self.config.recording_path);
        let timeout = self.config.media_timeout();

        let answer = match tokio::time::timeout(
            timeout,
            media.bridge().create_answer(&invite.body, &self.config.ice_servers),
        )
        .await
        {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => return Err(media.abandon(e).await),
            Err(_) => {
                return Err(media
                    .abandon(ClientError::MediaTimeout { after: timeout })
                    .await)
            }
        };
        debug!("Media answer ready ({} bytes)", answer.len());

        let ok = SimpleResponseBuilder::new(invite, StatusCode::Ok)
            .to_tag(self.dialog.to_tag.clone())
            .header(names::CONTACT, self.dialog.contact())
            .body(SDP_CONTENT_TYPE, answer)
            .user_agent(self.config.user_agent.clone())
            .build();
        if let Err(e) = self.layer.send(&ok).await {
            return Err(media.abandon(e.into()).await);
        }

        info!("Call answered");
        self.transition(CallState::InCall);
        Ok(media)
    }
}

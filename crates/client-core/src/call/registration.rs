use tracing::{debug, info, warn};

use wsphone_sip_core::auth::{extract_nonce, DigestCredentials};
use wsphone_sip_core::builder::SimpleRequestBuilder;
use wsphone_sip_core::{names, Message};

use super::{CallAgent, CallState};
use crate::error::{ClientError, ClientResult};

const REGISTER: &str = "REGISTER";

impl CallAgent {
    /// Registers the endpoint, answering at most one digest challenge
    pub(super) async fn register(&mut self) -> ClientResult<()> {
        self.transition(CallState::Registering);

        let register = self.build_register();
        let response = self.layer.request(&register).await?;

        let response = match challenge(&response) {
            Some(Challenge { header, credentials_header }) => {
                let nonce = extract_nonce(header).ok_or_else(|| ClientError::MissingNonce {
                    challenge: header.to_string(),
                })?;
                debug!("Registrar challenged with {}, retrying with credentials", response.subject);

                let authorization = self.credentials().authorization(
                    REGISTER,
                    &self.sip_info.registrar_uri(),
                    &nonce,
                );
                let mut retry = register;
                retry.headers.insert(credentials_header, authorization);

                let response = self.layer.request(&retry).await?;
                if challenge(&response).is_some() {
                    warn!("Registrar rejected our credentials with {}", response.subject);
                    return Err(ClientError::AuthenticationLoop);
                }
                response
            }
            None => response,
        };

        if !is_success(&response) {
            return Err(ClientError::RegistrationFailed {
                status: response.status_code().unwrap_or_default(),
            });
        }

        info!("Registered {} via {}", self.sip_info.address(), self.sip_info.outbound_proxy);
        self.transition(CallState::Registered);
        Ok(())
    }

    /// The REGISTER request; a retry is this exact request plus credentials
    fn build_register(&mut self) -> Message {
        let aor = format!("<sip:{}>", self.sip_info.address());
        SimpleRequestBuilder::new(REGISTER, &self.sip_info.registrar_uri())
            .header(names::CSEQ, self.dialog.next_cseq(REGISTER))
            .header(names::CALL_ID, self.dialog.call_id.clone())
            .header(
                names::CONTACT,
                format!("{};expires={}", self.dialog.contact(), self.config.register_expires),
            )
            .header(names::FROM, format!("{};tag={}", aor, self.dialog.from_tag))
            .header(names::TO, aor)
            .header(
                names::VIA,
                format!("SIP/2.0/WSS {};branch={}", self.dialog.pseudo_domain, self.dialog.branch()),
            )
            .user_agent(self.config.user_agent.clone())
            .build()
    }

    fn credentials(&self) -> DigestCredentials {
        DigestCredentials::new(
            self.sip_info.authorization_id.clone(),
            self.sip_info.password.clone(),
            self.sip_info.domain.clone(),
        )
    }
}

/// A digest challenge and the header that must answer it
struct Challenge<'a> {
    header: &'a str,
    credentials_header: &'static str,
}

/// The challenge of a non-2xx response, if it carries one
///
/// Registrars challenge with `WWW-Authenticate` (answered by `Authorization`),
/// proxies with `Proxy-Authenticate` (answered by `Proxy-Authorization`).
fn challenge(response: &Message) -> Option<Challenge<'_>> {
    if is_success(response) {
        return None;
    }
    if let Some(header) = response.header(names::WWW_AUTHENTICATE) {
        return Some(Challenge {
            header,
            credentials_header: names::AUTHORIZATION,
        });
    }
    response
        .header(names::PROXY_AUTHENTICATE)
        .map(|header| Challenge {
            header,
            credentials_header: names::PROXY_AUTHORIZATION,
        })
}

fn is_success(response: &Message) -> bool {
    response
        .status_code()
        .is_some_and(|status| (200..300).contains(&status))
}

//! The call state machine
//!
//! [`CallAgent`] drives one session from registration to hang-up. It owns the
//! transaction layer and its inbound mailbox, so every inbound message is
//! handled by exactly one state, in arrival order.

mod answer;
mod in_call;
mod registration;
mod state;

pub use state::CallState;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use wsphone_sip_core::Message;
use wsphone_sip_transport::WebSocketTransport;
use wsphone_transaction_core::{TransactionError, TransactionLayer};

use crate::config::ClientConfig;
use crate::dialog::DialogContext;
use crate::error::ClientResult;
use crate::media::MediaBridge;
use crate::sip_info::SipInfo;

/// Registers, answers one inbound call and follows it until BYE
pub struct CallAgent {
    sip_info: SipInfo,
    config: ClientConfig,
    dialog: DialogContext,
    layer: TransactionLayer,
    inbound: mpsc::UnboundedReceiver<Message>,
    bridge: Arc<dyn MediaBridge>,
    state_tx: watch::Sender<CallState>,
}

impl CallAgent {
    /// Creates an agent over an existing transaction layer
    pub fn new(
        sip_info: SipInfo,
        config: ClientConfig,
        layer: TransactionLayer,
        inbound: mpsc::UnboundedReceiver<Message>,
        bridge: Arc<dyn MediaBridge>,
    ) -> Self {
        let (state_tx, _) = watch::channel(CallState::Idle);
        Self {
            sip_info,
            config,
            dialog: DialogContext::new(),
            layer,
            inbound,
            bridge,
            state_tx,
        }
    }

    /// Opens the WebSocket connection to the outbound proxy and creates an
    /// agent on top of it
    pub async fn connect(
        sip_info: SipInfo,
        config: ClientConfig,
        bridge: Arc<dyn MediaBridge>,
    ) -> ClientResult<Self> {
        sip_info.validate()?;
        config.validate()?;

        let (transport, events) = WebSocketTransport::connect(&sip_info.outbound_proxy, None).await?;
        info!("Connected to {}", transport.url());

        let (layer, inbound) = TransactionLayer::new(Arc::new(transport), events);
        let layer = layer.with_timeout(config.transaction_timeout());
        Ok(Self::new(sip_info, config, layer, inbound, bridge))
    }

    /// Replaces the generated dialog identifiers
    pub fn with_dialog(mut self, dialog: DialogContext) -> Self {
        self.dialog = dialog;
        self
    }

    pub fn dialog(&self) -> &DialogContext {
        &self.dialog
    }

    pub fn sip_info(&self) -> &SipInfo {
        &self.sip_info
    }

    pub fn state(&self) -> CallState {
        *self.state_tx.borrow()
    }

    /// Subscribes to state changes
    pub fn subscribe(&self) -> watch::Receiver<CallState> {
        self.state_tx.subscribe()
    }

    /// Runs the whole session
    ///
    /// Returns `Ok` after the remote party hung up. Any failure before that
    /// is returned as the error; in both cases the agent ends `Terminated`
    /// and the connection is closed.
    pub async fn run(mut self) -> ClientResult<()> {
        let result = self.drive().await;
        if let Err(e) = &result {
            error!("Call agent failed in state {}: {}", self.state(), e);
        }

        self.transition(CallState::Terminated);
        if let Err(e) = self.layer.close().await {
            debug!("Error closing transport: {}", e);
        }
        result
    }

    async fn drive(&mut self) -> ClientResult<()> {
        self.register().await?;
        let invite = self.wait_for_invite().await?;
        self.ring(&invite).await?;
        self.send_control_reply(&invite).await?;
        let media = self.answer(&invite).await?;
        self.in_call(media).await
    }

    // Terminated is absorbing
    fn transition(&self, next: CallState) {
        if self.state().is_terminated() {
            return;
        }
        let previous = self.state_tx.send_replace(next);
        if previous != next {
            info!("Call state {} -> {}", previous, next);
        }
    }

    // Next message from the mailbox; a closed mailbox means the transport is gone
    async fn next_inbound(&mut self) -> ClientResult<Message> {
        let message = self
            .inbound
            .recv()
            .await
            .ok_or(TransactionError::TransportClosed)?;
        Ok(message)
    }
}

impl std::fmt::Debug for CallAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallAgent")
            .field("sip_info", &self.sip_info)
            .field("dialog", &self.dialog)
            .field("state", &self.state())
            .finish()
    }
}

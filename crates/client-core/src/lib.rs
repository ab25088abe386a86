//! # wsphone client core
//!
//! The application layer of the wsphone stack: it registers one endpoint with
//! a SIP-over-WebSocket gateway, answers exactly one inbound call and follows
//! it until the remote party hangs up.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   SipInfo   ┌───────────────────────────────────────┐
//! │ Provisioner  │────────────►│ CallAgent (call state machine)        │
//! └──────────────┘             │  Idle → Registering → Registered →    │
//!                              │  Ringing → Answering → InCall →       │
//! ┌──────────────┐   offer /   │  Terminated                           │
//! │ MediaBridge  │◄──answer───►│                                       │
//! └──────┬───────┘             └──────────┬───────────────▲────────────┘
//!        │ MediaEvent                     │ send          │ inbound mailbox
//!        ▼                                ▼               │
//! ┌──────────────┐             ┌───────────────────────────────────────┐
//! │  Recorder    │             │ TransactionLayer (CSeq correlation)   │
//! └──────────────┘             └──────────┬────────────────────────────┘
//!                                         ▼
//!                                WebSocketTransport (`sip` subprotocol)
//! ```
//!
//! Besides plain SIP, the gateway piggybacks a small XML control protocol in
//! the `P-rc` header of the INVITE. The agent answers it with a `MESSAGE`
//! announcing that this endpoint takes the call ([`control`]), and later
//! acknowledges a takeover notification.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wsphone_client_core::{CallAgent, ClientConfig, JsonFileProvisioner, MediaBridge, Provisioner};
//!
//! # async fn example(bridge: Arc<dyn MediaBridge>) -> Result<(), Box<dyn std::error::Error>> {
//! let sip_info = JsonFileProvisioner::new("sip-provision.json").provision().await?;
//! let agent = CallAgent::connect(sip_info, ClientConfig::default(), bridge).await?;
//!
//! let mut states = agent.subscribe();
//! tokio::spawn(async move {
//!     while states.changed().await.is_ok() {
//!         println!("call state: {}", *states.borrow());
//!     }
//! });
//!
//! agent.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod call;
pub mod config;
pub mod control;
pub mod dialog;
pub mod error;
pub mod media;
pub mod provisioning;
pub mod sip_info;

pub use call::{CallAgent, CallState};
pub use config::ClientConfig;
pub use control::{ControlError, ControlHeader, ControlMessage, CMD_ANSWER, CMD_TAKEOVER};
pub use dialog::DialogContext;
pub use error::{ClientError, ClientResult};
pub use media::{MediaBridge, MediaEvent, Recorder};
pub use provisioning::{JsonFileProvisioner, Provisioner, StaticProvisioner};
pub use sip_info::SipInfo;

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::{
        CallAgent, CallState, ClientConfig, ClientError, ClientResult, DialogContext, MediaBridge,
        MediaEvent, Provisioner, SipInfo,
    };
}

//! # Transaction layer for the wsphone stack
//!
//! A single WebSocket connection carries every SIP message of a session, in
//! both directions. This crate sits on top of a [`Transport`] and splits that
//! stream in two:
//!
//! - responses to requests sent through [`TransactionLayer::send`] are matched
//!   by their exact `CSeq` value and handed back to the sender;
//! - everything else (inbound requests, unsolicited responses) is forwarded,
//!   in arrival order, to one inbound mailbox owned by the caller.
//!
//! Provisional `100 Trying` responses to a pending request are absorbed, and
//! every wait is bounded by a timeout (SIP Timer F, 32 seconds, by default).
//!
//! ```text
//!   TransactionLayer::send ──► Transport ──► gateway
//!          ▲                                    │
//!          │ CSeq match                         ▼
//!     pending waiters ◄── dispatch task ◄── TransportEvent
//!                               │
//!                               └──► inbound mailbox (requests, strays)
//! ```
//!
//! [`Transport`]: wsphone_sip_transport::Transport

pub mod error;
pub mod transaction;

pub use error::{Result, TransactionError};
pub use transaction::{TransactionLayer, DEFAULT_TRANSACTION_TIMEOUT};

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::{Result, TransactionError, TransactionLayer, DEFAULT_TRANSACTION_TIMEOUT};
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of the one call an agent handles
///
/// ```text
/// Idle → Registering → Registered → Ringing → Answering → InCall → Terminated
/// ```
///
/// Any failure jumps straight to `Terminated`, which is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallState {
    /// Nothing sent yet
    Idle,
    /// REGISTER sent, possibly retried with credentials
    Registering,
    /// Registered and waiting for an INVITE
    Registered,
    /// INVITE received; provisional responses and control reply in flight
    Ringing,
    /// Waiting for the media bridge to produce an answer
    Answering,
    /// 200 OK sent; watching for takeover and BYE
    InCall,
    /// Finished, successfully or not
    Terminated,
}

impl CallState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, CallState::Terminated)
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallState::Idle => "Idle",
            CallState::Registering => "Registering",
            CallState::Registered => "Registered",
            CallState::Ringing => "Ringing",
            CallState::Answering => "Answering",
            CallState::InCall => "InCall",
            CallState::Terminated => "Terminated",
        };
        f.write_str(name)
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use wsphone_sip_core::Message;
use wsphone_sip_transport::TransportEvent;

use super::PendingMap;

/// Routes transport events until the transport closes
///
/// Responses whose `CSeq` matches a pending request complete that request;
/// a `100 Trying` for a pending request is dropped. Everything else goes to
/// the inbound mailbox. On closure every pending waiter is released, which
/// its sender observes as `TransportClosed`.
pub(crate) async fn run_dispatch_loop(
    mut events: mpsc::Receiver<TransportEvent>,
    pending: PendingMap,
    closed: Arc<AtomicBool>,
    inbound_tx: mpsc::UnboundedSender<Message>,
) {
    debug!("Transaction dispatch loop starting");

    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::MessageReceived { message } => {
                trace!("Dispatching {}", message.summary());
                if let Some(message) = complete_pending(&pending, message).await {
                    if inbound_tx.send(message).is_err() {
                        debug!("Inbound mailbox dropped, discarding message");
                    }
                }
            }
            TransportEvent::Error { error } => {
                warn!("Discarding inbound frame: {}", error);
            }
            TransportEvent::Closed => {
                info!("Transport closed");
                break;
            }
        }
    }

    let mut pending = pending.lock().await;
    closed.store(true, Ordering::Release);
    if !pending.is_empty() {
        warn!("Failing {} pending transaction(s) on transport closure", pending.len());
    }
    pending.clear();
    debug!("Transaction dispatch loop terminated");
}

// Hands `message` to its waiter, or gives it back when nobody claims it
async fn complete_pending(pending: &PendingMap, message: Message) -> Option<Message> {
    if !message.is_response() {
        return Some(message);
    }
    let Some(cseq) = message.cseq() else {
        return Some(message);
    };

    let mut pending = pending.lock().await;
    if !pending.contains_key(cseq) {
        return Some(message);
    }
    if message.is_trying() {
        trace!("Absorbing 100 Trying for {}", cseq);
        return None;
    }

    let Some(waiter) = pending.remove(cseq) else {
        return Some(message);
    };
    let cseq = cseq.to_string();
    if let Err(message) = waiter.send(message) {
        debug!("Waiter for {} is gone, forwarding response", cseq);
        return Some(message);
    }
    None
}

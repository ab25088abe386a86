mod dispatch;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use wsphone_sip_core::Message;
use wsphone_sip_transport::{Transport, TransportEvent};

use crate::error::{Result, TransactionError};

/// Default bound on a request/response round trip (SIP Timer F, 64 * T1)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(32);

/// Waiters keyed by the exact `CSeq` header value of their request
pub(crate) type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<Message>>>>;

/// Request/response correlation over one shared transport
///
/// Created together with the inbound mailbox that receives every message not
/// claimed by a pending request. A background task owns the transport's event
/// receiver for as long as the layer lives.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use wsphone_sip_core::builder::SimpleRequestBuilder;
/// use wsphone_sip_transport::WebSocketTransport;
/// use wsphone_transaction_core::TransactionLayer;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (transport, events) = WebSocketTransport::connect("sip.example.com:8083", None).await?;
/// let (layer, mut inbound) = TransactionLayer::new(Arc::new(transport), events);
/// let layer = layer.with_timeout(Duration::from_secs(10));
///
/// let register = SimpleRequestBuilder::new("REGISTER", "sip:sip.example.com")
///     .header("CSeq", "8145 REGISTER")
///     .build();
/// let response = layer.send(&register).await?;
/// println!("{:?}", response.map(|r| r.subject));
///
/// while let Some(message) = inbound.recv().await {
///     println!("inbound: {}", message.subject);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TransactionLayer {
    transport: Arc<dyn Transport>,
    pending: PendingMap,
    closed: Arc<AtomicBool>,
    timeout: Duration,
    dispatcher: JoinHandle<()>,
}

impl TransactionLayer {
    /// Wraps `transport` and starts dispatching `events`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        transport: Arc<dyn Transport>,
        events: mpsc::Receiver<TransportEvent>,
    ) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let dispatcher = tokio::spawn(dispatch::run_dispatch_loop(
            events,
            pending.clone(),
            closed.clone(),
            inbound_tx,
        ));

        let layer = TransactionLayer {
            transport,
            pending,
            closed,
            timeout: DEFAULT_TRANSACTION_TIMEOUT,
            dispatcher,
        };

        (layer, inbound_rx)
    }

    /// Sets how long [`send`](Self::send) waits for a response
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the underlying transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Returns true once the transport reported closure
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of requests still waiting for a response
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Sends a message
    ///
    /// Responses are written and resolve to `None` at once. Requests resolve
    /// to the first inbound response carrying the same `CSeq` value, skipping
    /// `100 Trying`.
    pub async fn send(&self, message: &Message) -> Result<Option<Message>> {
        if message.is_response() {
            self.transport.send_message(message).await?;
            return Ok(None);
        }
        self.request(message).await.map(Some)
    }

    /// Sends a request and waits for its final (or first non-100) response
    pub async fn request(&self, request: &Message) -> Result<Message> {
        if request.is_response() {
            return Err(TransactionError::NotARequest(request.subject.clone()));
        }

        let cseq = request
            .cseq()
            .ok_or(TransactionError::MissingCSeq)?
            .to_string();

        let response_rx = {
            let mut pending = self.pending.lock().await;
            if self.is_closed() {
                return Err(TransactionError::TransportClosed);
            }
            if pending.contains_key(&cseq) {
                return Err(TransactionError::DuplicateTransaction(cseq));
            }
            let (response_tx, response_rx) = oneshot::channel();
            pending.insert(cseq.clone(), response_tx);
            trace!("Waiting for response to CSeq {}", cseq);
            response_rx
        };

        if let Err(e) = self.transport.send_message(request).await {
            self.pending.lock().await.remove(&cseq);
            return Err(e.into());
        }
        debug!("Sent {}", request.summary());

        match tokio::time::timeout(self.timeout, response_rx).await {
            Ok(Ok(response)) => {
                debug!("Transaction {} completed with {}", cseq, response.subject);
                Ok(response)
            }
            Ok(Err(_)) => Err(TransactionError::TransportClosed),
            Err(_) => {
                self.pending.lock().await.remove(&cseq);
                warn!("Transaction {} timed out after {:?}", cseq, self.timeout);
                Err(TransactionError::Timeout {
                    cseq,
                    after: self.timeout,
                })
            }
        }
    }

    /// Closes the underlying transport
    pub async fn close(&self) -> Result<()> {
        self.transport.close().await?;
        Ok(())
    }
}

impl std::fmt::Debug for TransactionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLayer")
            .field("transport", &self.transport)
            .field("timeout", &self.timeout)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for TransactionLayer {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}

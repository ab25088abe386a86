#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::time::{timeout, Duration};

use wsphone_client_core::{
    CallAgent, ClientConfig, ClientError, ClientResult, MediaBridge, MediaEvent, SipInfo,
};
use wsphone_sip_core::builder::SimpleResponseBuilder;
use wsphone_sip_core::{parse_message, Message, StatusCode};
use wsphone_sip_transport::{Error as TransportError, Transport, TransportEvent};
use wsphone_transaction_core::TransactionLayer;

pub const OFFER_SDP: &str = "v=0\r\no=- 1 1 IN IP4 104.245.57.165\r\ns=SmcSip\r\nm=audio 20012 UDP/TLS/RTP/SAVPF 0 101\r\n";
pub const ANSWER_SDP: &str = "v=0\r\no=- 2 2 IN IP4 127.0.0.1\r\ns=-\r\nm=audio 9 UDP/TLS/RTP/SAVPF 0\r\n";
pub const SAMPLES: &[u8] = &[0x10, 0x20, 0x30, 0x40];

/// Authorization value for `sip_info()` and nonce `abc123`
pub const EXPECTED_AUTHORIZATION: &str = "Digest algorithm=MD5, username=\"alice-auth\", realm=\"sip.example.com\", nonce=\"abc123\", uri=\"sip:sip.example.com\", response=\"7711a1114928e8d96a796596c92fbd3a\"";

pub const CONTROL_OFFER: &str = r##"<Msg><Hdr SID="35888" Req="{A1B2}" From="#1337@sip.example.com" To="101" Cmd="6"/><Bdy SrvLvl="-149" Phn="+16501234567"/></Msg>"##;

/// Routes `tracing` output to the test harness; set `RUST_LOG` to see it
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn sip_info() -> SipInfo {
    SipInfo {
        domain: "sip.example.com".to_string(),
        username: "101".to_string(),
        authorization_id: "alice-auth".to_string(),
        outbound_proxy: "sip123.example.com:8083".to_string(),
        password: "s3cret".to_string(),
    }
}

pub fn temp_recording_path() -> PathBuf {
    std::env::temp_dir().join(format!("wsphone-call-{}.raw", uuid::Uuid::new_v4()))
}

/// Mock transport that records sent messages and lets the test play the
/// gateway by injecting inbound ones.
#[derive(Debug, Clone)]
pub struct MockTransport {
    pub sent_messages: Arc<Mutex<Vec<Message>>>,
    pub event_tx: mpsc::Sender<TransportEvent>,
    is_closed: Arc<AtomicBool>,
    message_sent_notifier: Arc<Notify>,
}

impl MockTransport {
    pub fn new() -> (Self, mpsc::Receiver<TransportEvent>) {
        let (event_tx, event_rx) = mpsc::channel(100);
        let transport = Self {
            sent_messages: Arc::new(Mutex::new(Vec::new())),
            event_tx,
            is_closed: Arc::new(AtomicBool::new(false)),
            message_sent_notifier: Arc::new(Notify::new()),
        };
        (transport, event_rx)
    }

    pub async fn sent(&self) -> Vec<Message> {
        self.sent_messages.lock().await.clone()
    }

    /// Waits until at least `count` messages were sent and returns them all
    pub async fn wait_for_sent(&self, count: usize) -> Vec<Message> {
        timeout(Duration::from_secs(5), async {
            loop {
                let notified = self.message_sent_notifier.notified();
                let sent = self.sent().await;
                if sent.len() >= count {
                    return sent;
                }
                notified.await;
            }
        })
        .await
        .expect("timed out waiting for sent messages")
    }

    pub async fn inject(&self, raw: &str) {
        let message = parse_message(raw).expect("test message must parse");
        self.inject_message(message).await;
    }

    pub async fn inject_message(&self, message: Message) {
        self.event_tx
            .send(TransportEvent::MessageReceived { message })
            .await
            .expect("dispatch loop is gone");
    }

    pub async fn inject_closed(&self) {
        self.event_tx
            .send(TransportEvent::Closed)
            .await
            .expect("dispatch loop is gone");
    }

    /// Answers `request` the way a gateway would
    pub async fn respond(&self, request: &Message, status: StatusCode, extra: &[(&str, &str)]) {
        let mut builder = SimpleResponseBuilder::new(request, status).to_tag("gw-tag");
        for (name, value) in extra {
            builder = builder.header(*name, *value);
        }
        self.inject_message(builder.build()).await;
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_message(&self, message: &Message) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::TransportClosed);
        }
        self.sent_messages.lock().await.push(message.clone());
        self.message_sent_notifier.notify_waiters();
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.is_closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.is_closed.load(Ordering::SeqCst)
    }
}

/// Media bridge double: answers with a fixed SDP, plays one track with a
/// single batch of samples and counts `stop` calls.
pub struct FakeMediaBridge {
    answer: String,
    delay: Option<Duration>,
    fail: bool,
    stops: AtomicUsize,
    offers: StdMutex<Vec<(String, Vec<String>)>>,
    events_tx: StdMutex<Option<mpsc::Sender<MediaEvent>>>,
    events_rx: StdMutex<Option<mpsc::Receiver<MediaEvent>>>,
}

impl FakeMediaBridge {
    pub fn new(answer: &str) -> Self {
        let (tx, rx) = mpsc::channel(16);
        Self {
            answer: answer.to_string(),
            delay: None,
            fail: false,
            stops: AtomicUsize::new(0),
            offers: StdMutex::new(Vec::new()),
            events_tx: StdMutex::new(Some(tx)),
            events_rx: StdMutex::new(Some(rx)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn offers(&self) -> Vec<(String, Vec<String>)> {
        self.offers.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaBridge for FakeMediaBridge {
    async fn create_answer(&self, offer: &str, ice_servers: &[String]) -> ClientResult<String> {
        self.offers
            .lock()
            .unwrap()
            .push((offer.to_string(), ice_servers.to_vec()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ClientError::media("no compatible codec"));
        }

        let tx = self.events_tx.lock().unwrap().clone();
        if let Some(tx) = tx {
            let _ = tx.send(MediaEvent::TrackAvailable).await;
            let _ = tx.send(MediaEvent::Samples(Bytes::from_static(SAMPLES))).await;
        }
        Ok(self.answer.clone())
    }

    fn take_events(&self) -> Option<mpsc::Receiver<MediaEvent>> {
        self.events_rx.lock().unwrap().take()
    }

    async fn stop(&self) -> ClientResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.events_tx.lock().unwrap().take();
        Ok(())
    }
}

/// An agent wired to a mock transport
pub fn agent_with(
    config: ClientConfig,
    bridge: Arc<FakeMediaBridge>,
) -> (CallAgent, MockTransport) {
    init_tracing();
    let (transport, events) = MockTransport::new();
    let (layer, inbound) = TransactionLayer::new(Arc::new(transport.clone()), events);
    let layer = layer.with_timeout(config.transaction_timeout());
    let agent = CallAgent::new(sip_info(), config, layer, inbound, bridge);
    (agent, transport)
}

pub fn invite(cseq: u32, control: Option<&str>) -> String {
    let control = control
        .map(|xml| format!("P-rc: {}\r\n", xml))
        .unwrap_or_default();
    format!(
        "INVITE sip:9f3c@abc.invalid;transport=ws SIP/2.0\r\n\
         Via: SIP/2.0/WSS 104.245.57.165:8083;rport;branch=z9hG4bK-{cseq}\r\n\
         From: \"WIRELESS CALLER\" <sip:+16501234567@sip.example.com>;tag=10.13.121.11-5060-a\r\n\
         To: \"Alice\" <sip:101@sip.example.com>\r\n\
         Call-ID: 1e7a8c45-{cseq}\r\n\
         CSeq: {cseq} INVITE\r\n\
         Content-Type: application/sdp\r\n\
         {control}\
         Content-Length: {len}\r\n\
         \r\n\
         {body}",
        cseq = cseq,
        control = control,
        len = OFFER_SDP.len(),
        body = OFFER_SDP,
    )
}

pub fn takeover_message(cseq: u32) -> String {
    let body = r##"<Msg><Hdr SID="35888" Req="{A1B2}" From="#1337@sip.example.com" To="101" Cmd="7"/><Bdy/></Msg>"##;
    format!(
        "MESSAGE sip:101@sip.example.com SIP/2.0\r\n\
         Via: SIP/2.0/WSS 104.245.57.165:8083;branch=z9hG4bK-m{cseq}\r\n\
         From: <sip:#1337@sip.example.com>;tag=ctl\r\n\
         To: <sip:101@sip.example.com>\r\n\
         Call-ID: ctl-{cseq}\r\n\
         CSeq: {cseq} MESSAGE\r\n\
         Content-Type: x-rc/agent\r\n\
         Content-Length: {len}\r\n\
         \r\n\
         {body}",
        cseq = cseq,
        len = body.len(),
        body = body,
    )
}

pub fn bye(cseq: u32, to_tag: &str) -> String {
    format!(
        "BYE sip:9f3c@abc.invalid;transport=ws SIP/2.0\r\n\
         Via: SIP/2.0/WSS 104.245.57.165:8083;branch=z9hG4bK-b{cseq}\r\n\
         From: \"WIRELESS CALLER\" <sip:+16501234567@sip.example.com>;tag=10.13.121.11-5060-a\r\n\
         To: \"Alice\" <sip:101@sip.example.com>;tag={to_tag}\r\n\
         Call-ID: 1e7a8c45-1\r\n\
         CSeq: {cseq} BYE\r\n\
         Content-Length: 0\r\n\
         \r\n",
        cseq = cseq,
        to_tag = to_tag,
    )
}

/// Plays the gateway from REGISTER up to the 200 OK answering the call
///
/// Returns the six messages the agent sent: REGISTER, REGISTER with
/// credentials, 100 Trying, 180 Ringing, the control MESSAGE and 200 OK.
pub async fn play_until_answered(transport: &MockTransport) -> Vec<Message> {
    let sent = transport.wait_for_sent(1).await;
    transport
        .respond(
            &sent[0],
            StatusCode::Unauthorized,
            &[(
                "Www-Authenticate",
                "Digest realm=\"sip.example.com\", nonce=\"abc123\", algorithm=MD5",
            )],
        )
        .await;

    let sent = transport.wait_for_sent(2).await;
    transport.respond(&sent[1], StatusCode::Ok, &[]).await;

    transport.inject(&invite(1, Some(CONTROL_OFFER))).await;

    let sent = transport.wait_for_sent(5).await;
    transport.respond(&sent[4], StatusCode::Ok, &[]).await;

    transport.wait_for_sent(6).await
}

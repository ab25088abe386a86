use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use wsphone_sip_core::{parse_message, Message};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportEvent};

// SIP WebSocket subprotocol name as per RFC 7118
pub(crate) const SIP_WS_SUBPROTOCOL: &str = "sip";

// Default channel capacity
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;

/// Client-side WebSocket transport for SIP messages
///
/// Each WebSocket text frame carries exactly one SIP message (RFC 7118).
#[derive(Clone)]
pub struct WebSocketTransport {
    inner: Arc<WebSocketTransportInner>,
}

struct WebSocketTransportInner {
    url: String,
    writer: Mutex<WsWriter>,
    closed: AtomicBool,
}

impl WebSocketTransport {
    /// Connects to a SIP WebSocket server
    ///
    /// `target` is either a full `ws://` / `wss://` URL or a bare
    /// `host[:port][/path]` outbound proxy, which is reached over `wss://`.
    pub async fn connect(
        target: &str,
        channel_capacity: Option<usize>,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        let url = websocket_url(target);

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| Error::InvalidUrl(url.clone(), e.to_string()))?;
        request
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SIP_WS_SUBPROTOCOL));

        info!("Connecting SIP WebSocket transport to {}", url);
        let (stream, response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| match e {
                tungstenite::Error::Io(io_err) => Error::ConnectFailed(url.clone(), io_err.to_string()),
                other => Error::WebSocketHandshakeFailed(other.to_string()),
            })?;

        match response.headers().get(SEC_WEBSOCKET_PROTOCOL) {
            Some(protocol) => debug!("Server selected subprotocol {:?}", protocol),
            None => warn!("Server did not confirm the '{}' subprotocol", SIP_WS_SUBPROTOCOL),
        }

        let (writer, reader) = stream.split();
        let capacity = channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        let (events_tx, events_rx) = mpsc::channel(capacity);

        let transport = WebSocketTransport {
            inner: Arc::new(WebSocketTransportInner {
                url,
                writer: Mutex::new(writer),
                closed: AtomicBool::new(false),
            }),
        };

        transport.spawn_receive_loop(reader, events_tx);

        Ok((transport, events_rx))
    }

    /// The URL this transport is connected to
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    // Spawns a task that turns incoming frames into transport events
    fn spawn_receive_loop(&self, mut reader: WsReader, events_tx: mpsc::Sender<TransportEvent>) {
        let transport = self.clone();

        tokio::spawn(async move {
            let inner = &transport.inner;

            while !inner.closed.load(Ordering::Relaxed) {
                let text = match reader.next().await {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Binary(data))) => match String::from_utf8(data) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Dropping non UTF-8 binary frame: {}", e);
                            continue;
                        }
                    },
                    Some(Ok(WsMessage::Close(frame))) => {
                        debug!("WebSocket closed by peer: {:?}", frame);
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        error!("Error reading from WebSocket {}: {}", inner.url, e);
                        let _ = events_tx
                            .send(TransportEvent::Error {
                                error: format!("WebSocket read error: {}", e),
                            })
                            .await;
                        break;
                    }
                    None => {
                        debug!("WebSocket stream from {} ended", inner.url);
                        break;
                    }
                };

                trace!("<-- Received SIP message:\n{}", text);

                let event = match parse_message(&text) {
                    Ok(message) => TransportEvent::MessageReceived { message },
                    Err(e) => {
                        warn!("Error parsing SIP message: {}", e);
                        TransportEvent::Error {
                            error: format!("Error parsing SIP message: {}", e),
                        }
                    }
                };

                if let Err(e) = events_tx.send(event).await {
                    error!("Error sending event: {}", e);
                    break;
                }
            }

            inner.closed.store(true, Ordering::Relaxed);
            let _ = events_tx.send(TransportEvent::Closed).await;
            info!("WebSocket receive loop terminated");
        });
    }
}

#[async_trait::async_trait]
impl Transport for WebSocketTransport {
    async fn send_message(&self, message: &Message) -> Result<()> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }

        let text = message.to_wire();
        debug!("Sending {} ({} bytes)", message.summary(), text.len());
        trace!("--> Sending SIP message:\n{}", text);

        let mut writer = self.inner.writer.lock().await;
        writer.send(WsMessage::Text(text)).await.map_err(|e| {
            self.inner.closed.store(true, Ordering::Relaxed);
            match e {
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                    Error::ConnectionClosedByPeer
                }
                tungstenite::Error::Protocol(msg) => Error::WebSocketProtocolError(msg.to_string()),
                other => Error::SendFailed(other.to_string()),
            }
        })
    }

    async fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::Relaxed) {
            return Ok(());
        }
        let mut writer = self.inner.writer.lock().await;
        writer
            .close()
            .await
            .map_err(|e| Error::WebSocketProtocolError(e.to_string()))
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebSocketTransport({})", self.inner.url)
    }
}

/// Turns an outbound proxy into a WebSocket URL, defaulting to `wss://`
pub fn websocket_url(target: &str) -> String {
    if target.starts_with("ws://") || target.starts_with("wss://") {
        target.to_string()
    } else {
        format!("wss://{}", target)
    }
}

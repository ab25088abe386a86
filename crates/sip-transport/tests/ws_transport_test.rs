//! WebSocket transport against an in-process `ws://` server

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;

use wsphone_sip_core::builder::SimpleRequestBuilder;
use wsphone_sip_transport::{Transport, TransportEvent, WebSocketTransport};

const OPTIONS_OK: &str = "SIP/2.0 200 OK\r\nCSeq: 1 OPTIONS\r\nContent-Length: 0\r\n\r\n";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Accepts one connection, echoes the subprotocol and runs `script` on it
async fn start_server<F, Fut>(script: F) -> String
where
    F: FnOnce(tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = |request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
            if let Some(protocol) = request.headers().get("Sec-WebSocket-Protocol") {
                assert_eq!(protocol, "sip");
                response
                    .headers_mut()
                    .insert("Sec-WebSocket-Protocol", HeaderValue::from_static("sip"));
            }
            Ok(response)
        };
        let ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();
        script(ws).await;
    });

    format!("ws://{}", addr)
}

async fn next_event(rx: &mut tokio::sync::mpsc::Receiver<TransportEvent>) -> TransportEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for transport event")
        .expect("event channel closed")
}

#[tokio::test]
async fn test_send_and_receive_sip_frames() {
    let url = start_server(|mut ws| async move {
        let frame = ws.next().await.unwrap().unwrap();
        let text = frame.into_text().unwrap();
        assert!(text.starts_with("OPTIONS sip:example.com SIP/2.0\r\n"));
        assert!(text.contains("CSeq: 1 OPTIONS\r\n"));

        ws.send(WsMessage::Text(OPTIONS_OK.to_string())).await.unwrap();
        ws.send(WsMessage::Text("garbage without separator".to_string())).await.unwrap();
        ws.close(None).await.unwrap();
    })
    .await;

    let (transport, mut events) = WebSocketTransport::connect(&url, None).await.unwrap();
    assert_eq!(transport.url(), url);

    let options = SimpleRequestBuilder::new("OPTIONS", "sip:example.com")
        .header("CSeq", "1 OPTIONS")
        .build();
    transport.send_message(&options).await.unwrap();

    match next_event(&mut events).await {
        TransportEvent::MessageReceived { message } => {
            assert_eq!(message.status_code(), Some(200));
            assert_eq!(message.cseq(), Some("1 OPTIONS"));
        }
        other => panic!("unexpected event {:?}", other),
    }

    assert!(matches!(next_event(&mut events).await, TransportEvent::Error { .. }));
    assert!(matches!(next_event(&mut events).await, TransportEvent::Closed));
    assert!(transport.is_closed());
}

#[tokio::test]
async fn test_send_after_close_fails() {
    let url = start_server(|mut ws| async move {
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let (transport, _events) = WebSocketTransport::connect(&url, Some(4)).await.unwrap();
    transport.close().await.unwrap();
    assert!(transport.is_closed());

    let options = SimpleRequestBuilder::new("OPTIONS", "sip:example.com").build();
    let result = transport.send_message(&options).await;
    assert!(matches!(result, Err(wsphone_sip_transport::Error::TransportClosed)));
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = WebSocketTransport::connect(&format!("ws://{}", addr), None).await;
    assert!(result.is_err());
}

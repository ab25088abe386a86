
use std::sync::Arc;

use tokio::time::{timeout, Duration};

use wsphone_sip_core::builder::SimpleResponseBuilder;
use wsphone_sip_core::StatusCode;
use wsphone_sip_transport::TransportEvent;
use wsphone_transaction_core::{TransactionError, TransactionLayer, DEFAULT_TRANSACTION_TIMEOUT};

use transaction_test_utils::{init_tracing, raw_response, request_with_cseq, MockTransport};

fn setup() -> (
    MockTransport,
    TransactionLayer,
    tokio::sync::mpsc::UnboundedReceiver<wsphone_sip_core::Message>,
) {
    init_tracing();
    let (transport, events) = MockTransport::new();
    let (layer, inbound) = TransactionLayer::new(Arc::new(transport.clone()), events);
    (transport, layer, inbound)
}

#[tokio::test]
async fn test_request_resolves_with_matching_response() {
    let (transport, layer, _inbound) = setup();
    assert_eq!(layer.timeout(), DEFAULT_TRANSACTION_TIMEOUT);

    let register = request_with_cseq("REGISTER", "8145 REGISTER");
    let peer = async {
        transport.wait_for_sent(1).await;
        transport.inject(&raw_response("200 OK", "8145 REGISTER")).await;
    };

    let (result, _) = tokio::join!(layer.send(&register), peer);
    let response = result.unwrap().expect("requests resolve with a response");
    assert_eq!(response.status_code(), Some(200));

    let sent = transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], register);
    assert_eq!(layer.pending_count().await, 0);
}

#[tokio::test]
async fn test_response_resolves_immediately() {
    let (transport, layer, _inbound) = setup();

    let invite = request_with_cseq("INVITE", "1 INVITE");
    let ringing = SimpleResponseBuilder::new(&invite, StatusCode::Ringing)
        .to_tag("t1")
        .build();

    let result = layer.send(&ringing).await.unwrap();
    assert!(result.is_none());
    assert_eq!(transport.sent().await, vec![ringing]);
    assert_eq!(layer.pending_count().await, 0);
}

#[tokio::test]
async fn test_trying_and_other_cseq_do_not_resolve() {
    let (transport, layer, mut inbound) = setup();

    let message = request_with_cseq("MESSAGE", "8146 MESSAGE");
    let peer = async {
        transport.wait_for_sent(1).await;
        transport.inject(&raw_response("100 Trying", "8146 MESSAGE")).await;
        transport.inject(&raw_response("200 OK", "9999 MESSAGE")).await;
        transport.inject(&raw_response("202 Accepted", "8146 MESSAGE")).await;
    };

    let (result, _) = tokio::join!(layer.send(&message), peer);
    let response = result.unwrap().unwrap();
    assert_eq!(response.status_code(), Some(202));

    // The stray response lands in the mailbox; the 100 Trying does not
    let stray = inbound.recv().await.unwrap();
    assert_eq!(stray.cseq(), Some("9999 MESSAGE"));
    assert!(inbound.try_recv().is_err());
}

#[tokio::test]
async fn test_unsolicited_trying_is_forwarded() {
    let (transport, _layer, mut inbound) = setup();

    transport.inject(&raw_response("100 Trying", "1 INVITE")).await;

    let forwarded = timeout(Duration::from_secs(1), inbound.recv()).await.unwrap().unwrap();
    assert!(forwarded.is_trying());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_removes_waiter() {
    let (transport, layer, mut inbound) = setup();
    let layer = layer.with_timeout(Duration::from_secs(32));

    let register = request_with_cseq("REGISTER", "8145 REGISTER");
    let err = layer.send(&register).await.unwrap_err();
    match &err {
        TransactionError::Timeout { cseq, after } => {
            assert_eq!(cseq, "8145 REGISTER");
            assert_eq!(*after, Duration::from_secs(32));
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert!(err.is_timeout());
    assert_eq!(layer.pending_count().await, 0);

    // A late response is no longer claimed
    transport.inject(&raw_response("200 OK", "8145 REGISTER")).await;
    let late = inbound.recv().await.unwrap();
    assert_eq!(late.status_code(), Some(200));
}

#[tokio::test]
async fn test_duplicate_cseq_rejected() {
    let (transport, layer, _inbound) = setup();

    let first = request_with_cseq("REGISTER", "8145 REGISTER");
    let second = first.clone();

    let peer = async {
        transport.wait_for_sent(1).await;
        let duplicate = layer.send(&second).await;
        assert!(matches!(
            duplicate,
            Err(TransactionError::DuplicateTransaction(ref cseq)) if cseq == "8145 REGISTER"
        ));
        transport.inject(&raw_response("200 OK", "8145 REGISTER")).await;
    };

    let (result, _) = tokio::join!(layer.send(&first), peer);
    assert!(result.unwrap().is_some());
    assert_eq!(transport.sent_message_count().await, 1);
}

#[tokio::test]
async fn test_missing_cseq_is_an_error() {
    let (transport, layer, _inbound) = setup();

    let request = wsphone_sip_core::builder::SimpleRequestBuilder::new("OPTIONS", "sip:x").build();
    let result = layer.send(&request).await;
    assert!(matches!(result, Err(TransactionError::MissingCSeq)));
    assert_eq!(transport.sent_message_count().await, 0);
}

#[tokio::test]
async fn test_closure_fails_pending_requests() {
    let (transport, layer, _inbound) = setup();

    let register = request_with_cseq("REGISTER", "8145 REGISTER");
    let peer = async {
        transport.wait_for_sent(1).await;
        transport.inject_event(TransportEvent::Closed).await;
    };

    let (result, _) = tokio::join!(layer.send(&register), peer);
    assert!(matches!(result, Err(TransactionError::TransportClosed)));
    assert!(layer.is_closed());

    let again = layer.send(&request_with_cseq("REGISTER", "8146 REGISTER")).await;
    assert!(matches!(again, Err(TransactionError::TransportClosed)));
}

#[tokio::test]
async fn test_send_failure_releases_waiter() {
    let (transport, layer, _inbound) = setup();
    transport.fail_sends();

    let result = layer.send(&request_with_cseq("REGISTER", "8145 REGISTER")).await;
    assert!(matches!(result, Err(TransactionError::Transport(_))));
    assert_eq!(layer.pending_count().await, 0);
}

#[tokio::test]
async fn test_inbound_requests_keep_arrival_order() {
    let (transport, _layer, mut inbound) = setup();

    transport
        .inject("INVITE sip:a@b.invalid SIP/2.0\r\nCSeq: 1 INVITE\r\n\r\n")
        .await;
    transport
        .inject_event(TransportEvent::Error {
            error: "garbage".to_string(),
        })
        .await;
    transport
        .inject("MESSAGE sip:a@b.invalid SIP/2.0\r\nCSeq: 2 MESSAGE\r\n\r\n")
        .await;
    transport
        .inject("BYE sip:a@b.invalid SIP/2.0\r\nCSeq: 3 BYE\r\n\r\n")
        .await;

    let mut methods = Vec::new();
    for _ in 0..3 {
        let message = timeout(Duration::from_secs(1), inbound.recv()).await.unwrap().unwrap();
        methods.push(message.method().unwrap().to_string());
    }
    assert_eq!(methods, vec!["INVITE", "MESSAGE", "BYE"]);
}

#[tokio::test]
async fn test_request_rejects_responses() {
    let (transport, layer, _inbound) = setup();

    let invite = request_with_cseq("INVITE", "1 INVITE");
    let ok = SimpleResponseBuilder::new(&invite, StatusCode::Ok).build();

    let result = layer.request(&ok).await;
    assert!(matches!(result, Err(TransactionError::NotARequest(ref subject)) if subject == "SIP/2.0 200 OK"));
    assert_eq!(transport.sent_message_count().await, 0);
}

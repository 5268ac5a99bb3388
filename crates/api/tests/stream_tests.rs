use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use logtide_api::{LogServerClient, ReconnectPolicy, StreamEvent};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

async fn next_event(events: &mut mpsc::Receiver<StreamEvent>) -> StreamEvent {
    timeout(WAIT, events.recv()).await.expect("event within timeout").expect("stream task alive")
}

fn record_json(level: &str, message: &str) -> String {
    format!(r#"{{"timestamp":"2024-03-01T10:00:00","level":"{level}","source":"auth-service","message":"{message}"}}"#)
}

#[tokio::test]
async fn delivers_records_in_order_and_reconnects_after_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.expect("accept first");
        let mut socket = accept_async(tcp).await.expect("handshake first");
        socket.send(Message::Text(record_json("info", "first"))).await.expect("send");
        socket.send(Message::Text("not a record".into())).await.expect("send");
        socket.send(Message::Text(record_json("ERROR", "second"))).await.expect("send");
        socket.close(None).await.expect("close");

        let (tcp, _) = listener.accept().await.expect("accept second");
        let mut socket = accept_async(tcp).await.expect("handshake second");
        socket.send(Message::Text(record_json("warning", "after reconnect"))).await.expect("send");
        while socket.next().await.is_some() {}
    });

    let client = LogServerClient::new(&format!("http://{addr}")).expect("client");
    let (sender, mut events) = mpsc::channel(32);
    let handle = client.stream(ReconnectPolicy::fixed(Duration::from_millis(50))).spawn(sender);

    assert_eq!(next_event(&mut events).await, StreamEvent::Connecting { attempt: 1 });
    assert_eq!(next_event(&mut events).await, StreamEvent::Opened);
    match next_event(&mut events).await {
        StreamEvent::Record(record) => assert_eq!(record.message, "first"),
        other => panic!("expected record, got {other:?}"),
    }
    match next_event(&mut events).await {
        StreamEvent::Malformed { payload, .. } => assert_eq!(payload, "not a record"),
        other => panic!("expected malformed, got {other:?}"),
    }
    match next_event(&mut events).await {
        StreamEvent::Record(record) => assert_eq!(record.level, "ERROR"),
        other => panic!("expected record, got {other:?}"),
    }
    match next_event(&mut events).await {
        StreamEvent::Closed { retry_in, .. } => assert_eq!(retry_in, Duration::from_millis(50)),
        other => panic!("expected close, got {other:?}"),
    }
    assert_eq!(next_event(&mut events).await, StreamEvent::Connecting { attempt: 2 });
    assert_eq!(next_event(&mut events).await, StreamEvent::Opened);
    match next_event(&mut events).await {
        StreamEvent::Record(record) => assert_eq!(record.message, "after reconnect"),
        other => panic!("expected record, got {other:?}"),
    }

    handle.abort();
}

#[tokio::test]
async fn failed_attempts_keep_retrying() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = LogServerClient::new(&format!("http://{addr}")).expect("client");
    let (sender, mut events) = mpsc::channel(32);
    let handle = client.stream(ReconnectPolicy::fixed(Duration::from_millis(20))).spawn(sender);

    for attempt in 1..=3 {
        assert_eq!(next_event(&mut events).await, StreamEvent::Connecting { attempt });
        match next_event(&mut events).await {
            StreamEvent::Closed { reason, retry_in } => {
                assert!(reason.is_some(), "a refused connection carries a reason");
                assert_eq!(retry_in, Duration::from_millis(20));
            }
            other => panic!("expected close, got {other:?}"),
        }
    }

    handle.abort();
}

#[tokio::test]
async fn task_stops_when_receiver_is_dropped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = LogServerClient::new(&format!("http://{addr}")).expect("client");
    let (sender, events) = mpsc::channel(1);
    let handle = client.stream(ReconnectPolicy::fixed(Duration::from_millis(10))).spawn(sender);
    drop(events);

    timeout(WAIT, handle).await.expect("task ends").expect("task did not panic");
}

#[tokio::test]
async fn dropped_connection_without_close_frame_reconnects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.expect("accept first");
        let mut socket = accept_async(tcp).await.expect("handshake first");
        socket.send(Message::Text(record_json("info", "before reset"))).await.expect("send");
        // no closing handshake
        drop(socket);

        let (tcp, _) = listener.accept().await.expect("accept second");
        let mut socket = accept_async(tcp).await.expect("handshake second");
        while socket.next().await.is_some() {}
    });

    let client = LogServerClient::new(&format!("http://{addr}")).expect("client");
    let (sender, mut events) = mpsc::channel(32);
    let handle = client.stream(ReconnectPolicy::fixed(Duration::from_millis(20))).spawn(sender);

    assert_eq!(next_event(&mut events).await, StreamEvent::Connecting { attempt: 1 });
    assert_eq!(next_event(&mut events).await, StreamEvent::Opened);
    match next_event(&mut events).await {
        StreamEvent::Record(record) => assert_eq!(record.message, "before reset"),
        other => panic!("expected record, got {other:?}"),
    }
    match next_event(&mut events).await {
        StreamEvent::Closed { reason, retry_in } => {
            assert!(reason.is_some(), "a transport error carries a reason");
            assert_eq!(retry_in, Duration::from_millis(20));
        }
        other => panic!("expected close, got {other:?}"),
    }
    assert_eq!(next_event(&mut events).await, StreamEvent::Connecting { attempt: 2 });
    assert_eq!(next_event(&mut events).await, StreamEvent::Opened);

    handle.abort();
}

#[tokio::test]
async fn idle_session_ends_when_receiver_is_dropped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (closed_tx, closed_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.expect("accept");
        let mut socket = accept_async(tcp).await.expect("handshake");
        // stays silent; only reads until the client goes away
        while let Some(Ok(frame)) = socket.next().await {
            if frame.is_close() {
                break;
            }
        }
        let _ = closed_tx.send(());
    });

    let client = LogServerClient::new(&format!("http://{addr}")).expect("client");
    let (sender, mut events) = mpsc::channel(32);
    let handle = client.stream(ReconnectPolicy::fixed(Duration::from_secs(60))).spawn(sender);

    assert_eq!(next_event(&mut events).await, StreamEvent::Connecting { attempt: 1 });
    assert_eq!(next_event(&mut events).await, StreamEvent::Opened);
    drop(events);

    timeout(WAIT, handle).await.expect("task ends").expect("task did not panic");
    timeout(WAIT, closed_rx).await.expect("server saw the socket close").expect("server task alive");
}

#[tokio::test]
async fn retry_wait_ends_when_receiver_is_dropped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = LogServerClient::new(&format!("http://{addr}")).expect("client");
    let (sender, mut events) = mpsc::channel(32);
    let handle = client.stream(ReconnectPolicy::fixed(Duration::from_secs(600))).spawn(sender);

    assert_eq!(next_event(&mut events).await, StreamEvent::Connecting { attempt: 1 });
    assert!(matches!(next_event(&mut events).await, StreamEvent::Closed { .. }));
    drop(events);

    timeout(WAIT, handle).await.expect("task ends").expect("task did not panic");
}

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tokio::sync::mpsc;
use tungstenite::protocol::Message;
use tungstenite::stream::MaybeTlsStream;

use super::WsActor;
use crate::actor::messages::{OrchestratorMsg, WsMsg};
use crate::deps::DepStatus;
use crate::protocol::server::start_ws_server;
use crate::protocol::{ClientMessage, ServerMessage};

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

async fn next(rx: &mut mpsc::Receiver<OrchestratorMsg>) -> OrchestratorMsg {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for orchestrator message")
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_subscriber_roundtrip() {
    let (ws_tx, ws_rx) = mpsc::channel(16);
    let (orch_tx, mut orch_rx) = mpsc::channel(16);
    let port = start_ws_server(LOCALHOST, 0, ws_tx.clone()).unwrap();
    tokio::spawn(WsActor::new(ws_rx, orch_tx).run());

    let mut socket = tokio::task::spawn_blocking(move || {
        let (socket, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();
        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();
        }
        socket
    })
    .await
    .unwrap();

    let id = match next(&mut orch_rx).await {
        OrchestratorMsg::SubscriberJoined(id) => id,
        other => panic!("expected SubscriberJoined, got {other:?}"),
    };

    // Malformed frames are dropped, valid ones forwarded
    socket
        .send(Message::Text(r#"{"type":"explode"}"#.into()))
        .unwrap();
    socket
        .send(Message::Text(r#"{"type":"cliCheck"}"#.into()))
        .unwrap();
    assert!(matches!(
        next(&mut orch_rx).await,
        OrchestratorMsg::Client(ClientMessage::CliCheck)
    ));

    ws_tx
        .send(WsMsg::SendTo {
            client: id + 100,
            msg: ServerMessage::CliStatus {
                status: DepStatus::Error,
            },
        })
        .await
        .unwrap();
    ws_tx
        .send(WsMsg::SendTo {
            client: id,
            msg: ServerMessage::CliStatus {
                status: DepStatus::Ready,
            },
        })
        .await
        .unwrap();
    ws_tx
        .send(WsMsg::Broadcast(ServerMessage::ToolchainStatus {
            status: DepStatus::Downloading,
        }))
        .await
        .unwrap();

    let (first, second) = tokio::task::spawn_blocking(move || {
        let first = socket.read().unwrap();
        let second = socket.read().unwrap();
        (first, second)
    })
    .await
    .unwrap();

    assert_eq!(
        first.to_text().unwrap(),
        r#"{"type":"cliStatus","status":"ready"}"#
    );
    assert_eq!(
        second.to_text().unwrap(),
        r#"{"type":"toolchainStatus","status":"downloading"}"#
    );

    ws_tx.send(WsMsg::Shutdown).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_handshake_is_not_registered() {
    let (ws_tx, ws_rx) = mpsc::channel(16);
    let (orch_tx, mut orch_rx) = mpsc::channel(16);
    let port = start_ws_server(LOCALHOST, 0, ws_tx.clone()).unwrap();
    tokio::spawn(WsActor::new(ws_rx, orch_tx).run());

    tokio::task::spawn_blocking(move || {
        use std::io::Write;
        let mut stream = std::net::TcpStream::connect((LOCALHOST, port)).unwrap();
        stream.write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
    })
    .await
    .unwrap();

    let joined = tokio::time::timeout(Duration::from_millis(500), orch_rx.recv()).await;
    assert!(joined.is_err(), "plain HTTP request registered as subscriber");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_orchestrator_queue_does_not_stall_broadcasts() {
    let (ws_tx, ws_rx) = mpsc::channel(16);
    let (orch_tx, mut orch_rx) = mpsc::channel(1);
    orch_tx.send(OrchestratorMsg::Shutdown).await.unwrap();

    let port = start_ws_server(LOCALHOST, 0, ws_tx.clone()).unwrap();
    tokio::spawn(WsActor::new(ws_rx, orch_tx).run());

    let mut socket = tokio::task::spawn_blocking(move || {
        let (socket, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();
        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();
        }
        socket
    })
    .await
    .unwrap();

    // Give the actor time to register the client behind the full queue
    tokio::time::sleep(Duration::from_millis(200)).await;
    ws_tx
        .send(WsMsg::Broadcast(ServerMessage::CliStatus {
            status: DepStatus::Ready,
        }))
        .await
        .unwrap();

    let frame = tokio::task::spawn_blocking(move || socket.read().unwrap())
        .await
        .unwrap();
    assert_eq!(
        frame.to_text().unwrap(),
        r#"{"type":"cliStatus","status":"ready"}"#
    );

    assert!(matches!(next(&mut orch_rx).await, OrchestratorMsg::Shutdown));
    assert!(matches!(
        next(&mut orch_rx).await,
        OrchestratorMsg::SubscriberJoined(1)
    ));

    ws_tx.send(WsMsg::Shutdown).await.unwrap();
}

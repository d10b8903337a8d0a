use std::time::Duration;

use async_trait::async_trait;
use binary::PacketWriter;
use server::{Config, EventHandler, EventManager, Server, ServerEvent};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use wire::PacketId;

struct Forward(mpsc::UnboundedSender<ServerEvent>);

#[async_trait]
impl EventHandler<ServerEvent> for Forward {
    async fn handle(&self, event: &ServerEvent) {
        let _ = self.0.send(event.clone());
    }
}

async fn start() -> (
    std::net::SocketAddr,
    server::PeerTable,
    mpsc::UnboundedReceiver<ServerEvent>,
    oneshot::Sender<()>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut events = EventManager::new();
    for name in [
        ServerEvent::CONNECTED,
        ServerEvent::PACKET,
        ServerEvent::DISCONNECTED,
    ] {
        events.register(name, Forward(tx.clone()));
    }

    let config = Config {
        port: 0,
        max_payload_bytes: 1024,
        ..Config::default()
    };
    let server = Server::bind(config, events).await.unwrap();
    let addr = server.local_addr().unwrap();
    let peers = server.peers();

    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(server.run(async move {
        let _ = stop_rx.await;
    }));
    (addr, peers, rx, stop_tx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> ServerEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test]
async fn packets_are_published_in_order() {
    let (addr, peers, mut rx, _stop) = start().await;

    let mut message = PacketWriter::new();
    message.write_str("peppy").write_str("hello").write_str("#osu").write_i32(0);
    let mut stream_bytes = PacketWriter::new().finish(PacketId::OsuPing);
    stream_bytes.extend(message.finish(PacketId::OsuSendPublicMessage));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    // Split mid-header so the server has to buffer.
    let (head, tail) = stream_bytes.split_at(10);
    stream.write_all(head).await.unwrap();
    stream.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    stream.write_all(tail).await.unwrap();

    assert!(matches!(next(&mut rx).await, ServerEvent::Connected { .. }));

    let ServerEvent::Packet { frame, .. } = next(&mut rx).await else {
        panic!("expected a packet");
    };
    assert_eq!(frame.kind(), Some(PacketId::OsuPing));

    let ServerEvent::Packet { frame, .. } = next(&mut rx).await else {
        panic!("expected a packet");
    };
    assert_eq!(frame.kind(), Some(PacketId::OsuSendPublicMessage));
    let mut reader = frame.reader();
    assert_eq!(reader.read_str().unwrap(), "peppy");
    assert_eq!(reader.read_str().unwrap(), "hello");

    drop(stream);
    let ServerEvent::Disconnected { reason, .. } = next(&mut rx).await else {
        panic!("expected a disconnect");
    };
    assert_eq!(reason, "connection closed");

    let stats = *peers.lock().await.get(&addr.ip()).unwrap();
    assert_eq!(stats.connections, 1);
    assert_eq!(stats.packets, 2);
    assert_eq!(stats.bytes_received, stream_bytes.len() as u64);
}

#[tokio::test]
async fn desynced_stream_is_dropped() {
    let (addr, _peers, mut rx, _stop) = start().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(&[0x04, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00])
        .await
        .unwrap();

    assert!(matches!(next(&mut rx).await, ServerEvent::Connected { .. }));
    let ServerEvent::Disconnected { reason, .. } = next(&mut rx).await else {
        panic!("expected a disconnect");
    };
    assert!(reason.contains("desync"), "{reason}");
    assert!(!reason.contains("Framing error: framing error"), "{reason}");
}

#[tokio::test]
async fn oversized_packet_is_dropped() {
    let (addr, _peers, mut rx, _stop) = start().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let header = binary::PacketHeader::new(PacketId::OsuSpectateFrames.raw(), 4096);
    stream.write_all(&header.to_bytes()).await.unwrap();

    assert!(matches!(next(&mut rx).await, ServerEvent::Connected { .. }));
    let ServerEvent::Disconnected { reason, .. } = next(&mut rx).await else {
        panic!("expected a disconnect");
    };
    assert!(reason.contains("payload bytes"), "{reason}");
}

#[tokio::test]
async fn truncated_packet_is_reported() {
    let (addr, _peers, mut rx, _stop) = start().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(&PacketWriter::new().finish(PacketId::OsuPing)[..5])
        .await
        .unwrap();
    stream.shutdown().await.unwrap();

    assert!(matches!(next(&mut rx).await, ServerEvent::Connected { .. }));
    let ServerEvent::Disconnected { reason, .. } = next(&mut rx).await else {
        panic!("expected a disconnect");
    };
    assert!(reason.contains("unfinished packet"), "{reason}");
}

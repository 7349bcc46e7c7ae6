//! End-to-end relay scenarios over real sockets
//!
//! Both listeners bind to port 0; every scenario runs a full server plus
//! library clients in-process.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use chatcast_rs::codec::encode_frame;
use chatcast_rs::error::Result as RelayResult;
use chatcast_rs::{
    ChatClient, ChatEvent, ClientConfig, FrameSource, RelayHandle, RelayServer, ServerConfig,
    VideoEvent, VideoFrame, VideoSubscriber,
};

const WAIT: Duration = Duration::from_secs(5);

async fn start_relay() -> (RelayHandle, ClientConfig) {
    let config = ServerConfig::default()
        .chat_addr("127.0.0.1:0".parse().unwrap())
        .video_addr("127.0.0.1:0".parse().unwrap());
    let (server, _events) = RelayServer::bind(config).await.expect("bind relay");

    let handle = server.handle();
    let client_config = ClientConfig::default()
        .chat_addr(server.chat_addr())
        .video_addr(server.video_addr());

    tokio::spawn(server.run());
    (handle, client_config)
}

/// Poll until the relay registers the expected number of chat peers.
async fn wait_for_peers(handle: &RelayHandle, expected: usize) {
    timeout(WAIT, async {
        while handle.peer_count().await != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("relay never reached {} peers", expected));
}

async fn next_message(events: &mut tokio::sync::mpsc::Receiver<ChatEvent>) -> String {
    loop {
        match timeout(WAIT, events.recv()).await.expect("timed out").unwrap() {
            ChatEvent::Message(message) => return message.as_str().to_owned(),
            ChatEvent::Connected => continue,
            ChatEvent::Disconnected => panic!("chat connection closed unexpectedly"),
        }
    }
}

#[tokio::test]
async fn chat_fanout_echo_and_disconnect_cleanup() {
    let (handle, client_config) = start_relay().await;

    let mut config_a = client_config.clone();
    config_a.name = "Alice".into();
    let (mut alice, mut alice_events) = ChatClient::new(config_a);
    alice.connect().await.unwrap();
    wait_for_peers(&handle, 1).await;

    let mut config_b = client_config.clone();
    config_b.name = "Bob".into();
    let (mut bob, mut bob_events) = ChatClient::new(config_b);
    bob.connect().await.unwrap();
    wait_for_peers(&handle, 2).await;

    // Alice greets; both peers (sender included) receive exactly the line.
    alice.send("hi").await.unwrap();
    assert_eq!(next_message(&mut bob_events).await, "Alice: hi");
    assert_eq!(next_message(&mut alice_events).await, "Alice: hi");

    // Alice leaves; within one receive cycle she is unregistered and the
    // next broadcast reaches one peer, not two.
    alice.disconnect().await;
    wait_for_peers(&handle, 1).await;

    let delivered = handle.broadcast_local("server", "maintenance at noon").await;
    assert_eq!(delivered, 1);
    assert_eq!(next_message(&mut bob_events).await, "server: maintenance at noon");

    let stats = handle.stats();
    assert_eq!(stats.messages_relayed, 2);
    assert_eq!(stats.chat_peers, 1);
}

#[tokio::test]
async fn large_message_survives_segmentation() {
    let (handle, client_config) = start_relay().await;

    let mut config_a = client_config.clone();
    config_a.name = "Alice".into();
    let (mut alice, _alice_events) = ChatClient::new(config_a);
    alice.connect().await.unwrap();

    let mut config_b = client_config.clone();
    config_b.name = "Bob".into();
    let (mut bob, mut bob_events) = ChatClient::new(config_b);
    bob.connect().await.unwrap();
    wait_for_peers(&handle, 2).await;

    // Far beyond one read chunk and beyond 64KB, so the kernel will
    // segment it arbitrarily on the way through.
    let text = "x".repeat(100_000);
    alice.send(&text).await.unwrap();

    let received = next_message(&mut bob_events).await;
    assert_eq!(received, format!("Alice: {}", text));
}

#[tokio::test]
async fn malformed_payload_drops_offender_only() {
    let (handle, client_config) = start_relay().await;

    let mut config_b = client_config.clone();
    config_b.name = "Bob".into();
    let (mut bob, mut bob_events) = ChatClient::new(config_b);
    bob.connect().await.unwrap();
    wait_for_peers(&handle, 1).await;

    // A raw socket speaking the framing but carrying invalid UTF-8.
    let mut rogue = TcpStream::connect(client_config.chat_addr).await.unwrap();
    wait_for_peers(&handle, 2).await;
    rogue
        .write_all(&encode_frame(&[0xFF, 0xFE, 0x92]))
        .await
        .unwrap();

    // The offender is unregistered; the healthy peer is untouched.
    wait_for_peers(&handle, 1).await;
    let delivered = handle.broadcast_local("server", "still here").await;
    assert_eq!(delivered, 1);
    assert_eq!(next_message(&mut bob_events).await, "server: still here");
}

/// Source producing sequence-stamped frames on a fixed cadence
struct CountingSource {
    ticker: tokio::time::Interval,
    seq: u64,
}

impl CountingSource {
    fn new(period: Duration) -> Self {
        Self {
            ticker: tokio::time::interval(period),
            seq: 0,
        }
    }
}

impl FrameSource for CountingSource {
    async fn next_frame(&mut self) -> RelayResult<VideoFrame> {
        self.ticker.tick().await;
        self.seq += 1;
        Ok(VideoFrame::new(self.seq.to_le_bytes().to_vec()))
    }
}

async fn first_frame(events: &mut tokio::sync::mpsc::Receiver<VideoEvent>) -> VideoFrame {
    loop {
        match timeout(WAIT, events.recv()).await.expect("timed out").unwrap() {
            VideoEvent::Frame(frame) => return frame,
            VideoEvent::Connected => continue,
            VideoEvent::Disconnected => panic!("video connection closed unexpectedly"),
        }
    }
}

#[tokio::test]
async fn video_subscriber_receives_monotonic_frames() {
    let (handle, client_config) = start_relay().await;
    handle.attach_source(CountingSource::new(Duration::from_millis(5)));

    let (mut subscriber, mut events) = VideoSubscriber::new(client_config);
    subscriber.connect().await.unwrap();

    let mut seen = Vec::new();
    while seen.len() < 5 {
        match timeout(WAIT, events.recv()).await.expect("timed out").unwrap() {
            VideoEvent::Frame(frame) => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(frame.data());
                seen.push(u64::from_le_bytes(raw));
            }
            VideoEvent::Connected => {}
            VideoEvent::Disconnected => panic!("video connection closed unexpectedly"),
        }
    }

    // A subscriber may skip superseded frames but never sees them out of
    // order or duplicated.
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", seen);
    assert!(handle.stats().frames_sent >= 5);
}

#[tokio::test]
async fn two_subscribers_are_independent() {
    let (handle, client_config) = start_relay().await;
    handle.attach_source(CountingSource::new(Duration::from_millis(5)));

    let (mut sub_a, mut events_a) = VideoSubscriber::new(client_config.clone());
    sub_a.connect().await.unwrap();
    let (mut sub_b, mut events_b) = VideoSubscriber::new(client_config);
    sub_b.connect().await.unwrap();

    let _ = first_frame(&mut events_a).await;

    // Killing one subscriber must not disturb the other.
    sub_a.disconnect();
    let frame = first_frame(&mut events_b).await;
    assert_eq!(frame.len(), 8);
}

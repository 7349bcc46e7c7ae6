//! Relay server demo with a synthetic video source
//!
//! Run with: cargo run --example relay_server [CHAT_ADDR [VIDEO_ADDR]]
//!
//! Examples:
//!   cargo run --example relay_server                          # 0.0.0.0:2500 / 0.0.0.0:9000
//!   cargo run --example relay_server 127.0.0.1:4500           # custom chat port
//!   cargo run --example relay_server 0.0.0.0:2500 0.0.0.0:9001
//!
//! Lines typed on stdin are broadcast as operator messages. The video
//! channel streams a synthetic test pattern; point `relay_client` at the
//! same addresses to watch both channels.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use chatcast_rs::error::Result as RelayResult;
use chatcast_rs::{FrameSource, RelayServer, ServerConfig, VideoFrame};

/// Synthetic source: a tiny "image" whose pixels cycle each frame.
///
/// Serialization is shape header (width, height, little-endian u16) plus
/// one byte per pixel; the demo client only reports sizes, so any agreed
/// scheme works.
struct TestPattern {
    ticker: tokio::time::Interval,
    seq: u64,
    width: u16,
    height: u16,
}

impl TestPattern {
    fn new(fps: u64) -> Self {
        Self {
            ticker: tokio::time::interval(Duration::from_millis(1000 / fps)),
            seq: 0,
            width: 64,
            height: 48,
        }
    }
}

impl FrameSource for TestPattern {
    async fn next_frame(&mut self) -> RelayResult<VideoFrame> {
        self.ticker.tick().await;
        self.seq += 1;

        let pixels = self.width as usize * self.height as usize;
        let mut data = Vec::with_capacity(4 + pixels);
        data.extend_from_slice(&self.width.to_le_bytes());
        data.extend_from_slice(&self.height.to_le_bytes());
        data.extend((0..pixels).map(|i| (i as u64 + self.seq) as u8));

        Ok(VideoFrame::new(data))
    }
}

fn parse_addr(arg: &str, default_port: u16) -> Result<SocketAddr, String> {
    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, default_port));
    }

    Err(format!(
        "Invalid address: '{}'. Expected IP:PORT, IP, or 'localhost'",
        arg
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chatcast_rs=debug".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = ServerConfig::default();
    if let Some(arg) = args.get(1) {
        config.chat_addr = parse_addr(arg, 2500).map_err(std::io::Error::other)?;
    }
    if let Some(arg) = args.get(2) {
        config.video_addr = parse_addr(arg, 9000).map_err(std::io::Error::other)?;
    }

    let (server, mut events) = RelayServer::bind(config).await?;
    let handle = server.handle();

    println!("Chat relay on   {}", server.chat_addr());
    println!("Video relay on  {}", server.video_addr());
    println!("Type a line to broadcast it as the server.");

    handle.attach_source(TestPattern::new(20));

    // Print relay lifecycle the way the original host window did.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                chatcast_rs::RelayEvent::MessageRelayed { message, .. } => {
                    println!("{}", message);
                }
                other => println!("[relay] {:?}", other),
            }
        }
    });

    // Operator chat from stdin.
    let operator = handle.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let delivered = operator.broadcast_local("server", text).await;
            println!("server: {} (to {} peers)", text, delivered);
        }
    });

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let stats = handle.stats();
    println!(
        "Relayed {} messages, published {} frames, sent {} frames",
        stats.messages_relayed, stats.frames_published, stats.frames_sent
    );

    Ok(())
}

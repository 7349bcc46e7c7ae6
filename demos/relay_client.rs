//! Terminal chat + video client
//!
//! Run with: cargo run --example relay_client [NAME [CHAT_ADDR [VIDEO_ADDR]]]
//!
//! Connects both channels, prints every chat broadcast, reports received
//! video frames, and sends each stdin line as a chat message.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, BufReader};

use chatcast_rs::{ChatClient, ChatEvent, ClientConfig, VideoEvent, VideoSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chatcast_rs=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let name = args.get(1).cloned().unwrap_or_else(|| "guest".into());

    let mut config = ClientConfig::with_name(&name);
    if let Some(arg) = args.get(2) {
        config.chat_addr = arg.parse::<SocketAddr>()?;
    }
    if let Some(arg) = args.get(3) {
        config.video_addr = arg.parse::<SocketAddr>()?;
    }

    let (mut chat, mut chat_events) = ChatClient::new(config.clone());
    chat.connect().await?;
    println!("*** connected as {}", name);

    tokio::spawn(async move {
        while let Some(event) = chat_events.recv().await {
            match event {
                ChatEvent::Message(message) => println!("{}", message),
                ChatEvent::Disconnected => {
                    println!("*** chat connection closed");
                    return;
                }
                ChatEvent::Connected => {}
            }
        }
    });

    let (mut video, mut video_events) = VideoSubscriber::new(config);
    video.connect().await?;

    // A real renderer would decode and draw here; the terminal client
    // just proves frames arrive whole.
    tokio::spawn(async move {
        let mut received = 0u64;
        while let Some(event) = video_events.recv().await {
            match event {
                VideoEvent::Frame(frame) => {
                    received += 1;
                    if received % 100 == 0 {
                        println!("*** {} video frames received (last {} bytes)", received, frame.len());
                    }
                }
                VideoEvent::Disconnected => {
                    println!("*** video connection closed");
                    return;
                }
                VideoEvent::Connected => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let text = line.trim();
        if text == "/quit" {
            break;
        }
        if !text.is_empty() {
            chat.send(text).await?;
        }
    }

    chat.disconnect().await;
    Ok(())
}

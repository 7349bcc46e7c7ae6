//! # chatcast-rs
//!
//! Chat and live video relay over two independent TCP channels.
//!
//! One host runs a [`RelayServer`]; any number of peers connect with
//! [`ChatClient`] (bidirectional text) and [`VideoSubscriber`]
//! (receive-only frames). Every payload on the wire is length-prefix
//! framed, so stream segmentation never leaks into message boundaries.
//!
//! # Architecture
//!
//! ```text
//!                         RelayServer
//!            ┌──────────────────┬──────────────────┐
//!       chat listener      video listener     FrameSource
//!            │                  │                  │ (one producer task)
//!      one task per conn   one task per sub        ▼
//!            │                  │          watch latest-frame cell
//!            ▼                  └──────────────◄───┘
//!      PeerRegistry ──broadcast──► per-peer writer tasks
//! ```
//!
//! - Chat: every received message is broadcast verbatim to all registered
//!   peers (sender included); membership and iteration share one lock.
//! - Video: subscribers stream the newest frame only; a slow subscriber
//!   skips superseded frames and never stalls the producer.
//!
//! # Example
//!
//! ```no_run
//! use chatcast_rs::{RelayServer, ServerConfig};
//!
//! # async fn example() -> chatcast_rs::error::Result<()> {
//! let (server, mut events) = RelayServer::bind(ServerConfig::default()).await?;
//! let handle = server.handle();
//!
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//! });
//!
//! handle.broadcast_local("server", "relay up").await;
//! server.run().await
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod message;
pub mod registry;
pub mod server;
pub mod source;
pub mod stats;

pub use client::{ChatClient, ChatEvent, ClientConfig, VideoEvent, VideoSubscriber};
pub use error::{Error, Result};
pub use message::ChatMessage;
pub use server::{RelayEvent, RelayHandle, RelayServer, ServerConfig};
pub use source::{FrameSource, VideoFrame};
pub use stats::StatsSnapshot;

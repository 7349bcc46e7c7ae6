//! Relay server
//!
//! Two independent TCP listeners share one relay: the chat listener feeds
//! the peer registry and broadcast path, the video listener feeds
//! subscriber workers off the shared latest-frame cell. One task per
//! accepted connection; the only cross-task structure is the registry
//! (lock-guarded) and the frame cell (watch).
//!
//! ```text
//!  chat :2500 ──accept──► reader task ──► PeerRegistry.broadcast ──► writer tasks
//!  video :9000 ──accept──► subscriber task ◄── watch cell ◄── producer ◄── FrameSource
//! ```

pub(crate) mod chat;
pub mod config;
pub mod listener;
pub(crate) mod video;

pub use config::ServerConfig;
pub use listener::{RelayEvent, RelayHandle, RelayServer};

//! Relay client implementation
//!
//! Client-side halves of both channels:
//! - Chat: send named messages, receive every broadcast
//! - Video: subscribe to the frame stream and reassemble it
//!
//! Each client surfaces reassembled units on an event channel; the
//! renderer collaborator drains the channel and is never handed partial
//! data.

pub mod chat;
pub mod config;
pub mod video;

pub use chat::{ChatClient, ChatEvent};
pub use config::ClientConfig;
pub use video::{VideoEvent, VideoSubscriber};

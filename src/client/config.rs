//! Client configuration

use std::net::SocketAddr;

use crate::codec::assembler::DEFAULT_MAX_FRAME_SIZE;

/// Client configuration options
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Chat server address
    pub chat_addr: SocketAddr,

    /// Video server address
    pub video_addr: SocketAddr,

    /// Display name embedded in outgoing messages
    pub name: String,

    /// Maximum accepted inbound frame size
    pub max_frame_size: usize,

    /// Read chunk size for reassembly
    pub read_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chat_addr: "127.0.0.1:2500".parse().unwrap(),
            video_addr: "127.0.0.1:9000".parse().unwrap(),
            name: "anonymous".into(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            read_buffer_size: 4 * 1024,
        }
    }
}

impl ClientConfig {
    /// Create a config with a display name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the chat server address
    pub fn chat_addr(mut self, addr: SocketAddr) -> Self {
        self.chat_addr = addr;
        self
    }

    /// Set the video server address
    pub fn video_addr(mut self, addr: SocketAddr) -> Self {
        self.video_addr = addr;
        self
    }

    /// Set the maximum accepted inbound frame size
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }
}

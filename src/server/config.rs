//! Relay server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::codec::assembler::DEFAULT_MAX_FRAME_SIZE;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address for the chat listener
    pub chat_addr: SocketAddr,

    /// Address for the video listener
    pub video_addr: SocketAddr,

    /// Maximum concurrent connections across both listeners (0 = unlimited)
    pub max_connections: usize,

    /// Read/write deadline per connection (zero = no deadline).
    ///
    /// With the default of zero a hung peer stalls its own worker
    /// indefinitely; nothing else is affected.
    pub idle_timeout: Duration,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Outbound queue depth per chat peer; a peer that falls this many
    /// messages behind is dropped
    pub peer_queue_capacity: usize,

    /// Maximum accepted inbound frame size
    pub max_frame_size: usize,

    /// Read chunk size for reassembly
    pub read_buffer_size: usize,

    /// Capacity of the relay event channel; events beyond it are dropped,
    /// never allowed to block the relay
    pub event_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            chat_addr: "0.0.0.0:2500".parse().unwrap(),
            video_addr: "0.0.0.0:9000".parse().unwrap(),
            max_connections: 0, // Unlimited
            idle_timeout: Duration::ZERO,
            tcp_nodelay: true, // Important for chat latency
            peer_queue_capacity: 64,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            read_buffer_size: 4 * 1024,
            event_capacity: 256,
        }
    }
}

impl ServerConfig {
    /// Set the chat listener address
    pub fn chat_addr(mut self, addr: SocketAddr) -> Self {
        self.chat_addr = addr;
        self
    }

    /// Set the video listener address
    pub fn video_addr(mut self, addr: SocketAddr) -> Self {
        self.video_addr = addr;
        self
    }

    /// Set maximum concurrent connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the per-connection read/write deadline
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the per-peer outbound queue depth
    pub fn peer_queue_capacity(mut self, capacity: usize) -> Self {
        self.peer_queue_capacity = capacity;
        self
    }

    /// Set the maximum accepted inbound frame size
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.chat_addr.port(), 2500);
        assert_eq!(config.video_addr.port(), 9000);
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.idle_timeout, Duration::ZERO);
        assert!(config.tcp_nodelay);
        assert_eq!(config.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
    }

    #[test]
    fn test_builder_chaining() {
        let chat: SocketAddr = "127.0.0.1:4500".parse().unwrap();
        let video: SocketAddr = "127.0.0.1:4501".parse().unwrap();
        let config = ServerConfig::default()
            .chat_addr(chat)
            .video_addr(video)
            .max_connections(50)
            .idle_timeout(Duration::from_secs(30))
            .peer_queue_capacity(8)
            .max_frame_size(1024);

        assert_eq!(config.chat_addr, chat);
        assert_eq!(config.video_addr, video);
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.peer_queue_capacity, 8);
        assert_eq!(config.max_frame_size, 1024);
    }
}

//! Relay statistics

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Live counters shared by every relay task
#[derive(Debug)]
pub struct RelayStats {
    started_at: Instant,
    /// Chat messages broadcast (client- and operator-originated)
    messages_relayed: AtomicU64,
    /// Chat payload bytes handed to peer queues
    chat_bytes_relayed: AtomicU64,
    /// Frames published by the producer task
    frames_published: AtomicU64,
    /// Framed frames written to subscriber sockets
    frames_sent: AtomicU64,
    /// Currently registered chat peers
    chat_peers: AtomicU64,
    /// Currently connected video subscribers
    video_subscribers: AtomicU64,
}

impl RelayStats {
    /// Create a zeroed stats block
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            messages_relayed: AtomicU64::new(0),
            chat_bytes_relayed: AtomicU64::new(0),
            frames_published: AtomicU64::new(0),
            frames_sent: AtomicU64::new(0),
            chat_peers: AtomicU64::new(0),
            video_subscribers: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_message(&self, payload_len: usize, delivered: usize) {
        self.messages_relayed.fetch_add(1, Ordering::Relaxed);
        self.chat_bytes_relayed
            .fetch_add(payload_len as u64 * delivered as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_frame_published(&self) {
        self.frames_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn peer_connected(&self) {
        self.chat_peers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn peer_disconnected(&self) {
        self.chat_peers.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn subscriber_connected(&self) {
        self.video_subscribers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn subscriber_disconnected(&self) {
        self.video_subscribers.fetch_sub(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.started_at.elapsed(),
            messages_relayed: self.messages_relayed.load(Ordering::Relaxed),
            chat_bytes_relayed: self.chat_bytes_relayed.load(Ordering::Relaxed),
            frames_published: self.frames_published.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            chat_peers: self.chat_peers.load(Ordering::Relaxed),
            video_subscribers: self.video_subscribers.load(Ordering::Relaxed),
        }
    }
}

impl Default for RelayStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of [`RelayStats`]
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    /// Time since the stats block was created
    pub uptime: std::time::Duration,
    pub messages_relayed: u64,
    pub chat_bytes_relayed: u64,
    pub frames_published: u64,
    pub frames_sent: u64,
    pub chat_peers: u64,
    pub video_subscribers: u64,
}

//! Per-peer handle stored in the registry

use std::net::SocketAddr;

use bytes::Bytes;
use tokio::sync::mpsc;

/// Session identifier assigned at accept time
pub type PeerId = u64;

/// Why a delivery to a peer failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverError {
    /// The peer's outbound queue is full (peer is not draining)
    QueueFull,
    /// The peer's writer task has exited
    Closed,
}

/// Registry-side handle for one chat peer.
///
/// Holds the send side of the peer's bounded outbound queue; the queue is
/// drained by that connection's dedicated writer task, so the socket handle
/// itself is never touched by more than one task.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: PeerId,
    addr: SocketAddr,
    tx: mpsc::Sender<Bytes>,
}

impl PeerHandle {
    /// Create a handle around a peer's outbound queue
    pub fn new(id: PeerId, addr: SocketAddr, tx: mpsc::Sender<Bytes>) -> Self {
        Self { id, addr, tx }
    }

    /// Session id of this peer
    pub fn id(&self) -> PeerId {
        self.id
    }

    /// Remote address of this peer
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Hand a frame to the peer's outbound queue without blocking.
    ///
    /// A full queue means the peer has stopped draining; both failure modes
    /// count as the peer's first failed send and lead to unregistration.
    pub fn deliver(&self, frame: Bytes) -> Result<(), DeliverError> {
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliverError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliverError::Closed,
        })
    }
}

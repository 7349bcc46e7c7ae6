//! Peer registry implementation
//!
//! The live set of chat peers eligible for broadcast. All mutation and
//! iteration happen under one lock, so a broadcast observes a consistent
//! membership snapshot and a removed peer is excluded from every later
//! send atomically.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::Mutex;

use super::peer::{PeerHandle, PeerId};

/// Registry of active chat peers
///
/// Broadcasts are serialized by the lock, which is what gives every live
/// member the same global message order. Delivery itself is a non-blocking
/// queue hand-off, so holding the lock across a broadcast never waits on a
/// slow peer's socket.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: Mutex<HashMap<PeerId, PeerHandle>>,
}

impl PeerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peer; called by the chat service right after accept
    pub async fn register(&self, handle: PeerHandle) {
        let mut peers = self.peers.lock().await;
        let id = handle.id();
        let addr = handle.addr();
        peers.insert(id, handle);

        tracing::info!(peer = id, addr = %addr, total = peers.len(), "Chat peer registered");
    }

    /// Remove a peer; returns whether it was still present.
    ///
    /// Safe to call more than once; only the first call removes.
    pub async fn unregister(&self, id: PeerId) -> bool {
        let mut peers = self.peers.lock().await;
        let removed = peers.remove(&id).is_some();
        if removed {
            tracing::info!(peer = id, total = peers.len(), "Chat peer unregistered");
        }
        removed
    }

    /// Broadcast a frame to every registered peer.
    ///
    /// A failed delivery to one member never aborts delivery to the rest;
    /// the failed member is removed in the same critical section, so no
    /// later broadcast can observe it. Returns the number of peers the
    /// frame was handed to.
    pub async fn broadcast(&self, frame: Bytes) -> usize {
        let mut peers = self.peers.lock().await;

        let mut failed: Vec<PeerId> = Vec::new();
        let mut delivered = 0usize;

        for (id, handle) in peers.iter() {
            match handle.deliver(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(reason) => {
                    tracing::warn!(peer = *id, ?reason, "Dropping peer on failed delivery");
                    failed.push(*id);
                }
            }
        }

        for id in failed {
            peers.remove(&id);
        }

        delivered
    }

    /// Number of registered peers
    pub async fn len(&self) -> usize {
        self.peers.lock().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.peers.lock().await.is_empty()
    }

    /// Whether a peer is currently registered
    pub async fn contains(&self, id: PeerId) -> bool {
        self.peers.lock().await.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    fn test_peer(id: PeerId, capacity: usize) -> (PeerHandle, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        (PeerHandle::new(id, test_addr(), tx), rx)
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_members() {
        let registry = PeerRegistry::new();
        let (alice, mut alice_rx) = test_peer(1, 8);
        let (bob, mut bob_rx) = test_peer(2, 8);
        registry.register(alice).await;
        registry.register(bob).await;

        let delivered = registry.broadcast(Bytes::from_static(b"hello")).await;
        assert_eq!(delivered, 2);
        assert_eq!(alice_rx.recv().await.unwrap(), &b"hello"[..]);
        assert_eq!(bob_rx.recv().await.unwrap(), &b"hello"[..]);
    }

    #[tokio::test]
    async fn test_failed_member_removed_exactly_once() {
        let registry = PeerRegistry::new();
        let (alice, alice_rx) = test_peer(1, 8);
        let (bob, mut bob_rx) = test_peer(2, 8);
        registry.register(alice).await;
        registry.register(bob).await;

        // Alice's writer task is gone; her queue is closed.
        drop(alice_rx);

        let delivered = registry.broadcast(Bytes::from_static(b"m1")).await;
        assert_eq!(delivered, 1);
        assert_eq!(bob_rx.recv().await.unwrap(), &b"m1"[..]);
        assert!(!registry.contains(1).await);
        assert_eq!(registry.len().await, 1);

        // Already removed; later unregister is a no-op.
        assert!(!registry.unregister(1).await);

        let delivered = registry.broadcast(Bytes::from_static(b"m2")).await;
        assert_eq!(delivered, 1);
    }

    #[tokio::test]
    async fn test_full_queue_counts_as_failure() {
        let registry = PeerRegistry::new();
        let (slow, _slow_rx) = test_peer(1, 1);
        registry.register(slow).await;

        assert_eq!(registry.broadcast(Bytes::from_static(b"fits")).await, 1);
        // Queue holds one undrained frame; the next delivery fails.
        assert_eq!(registry.broadcast(Bytes::from_static(b"full")).await, 0);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_members_observe_one_global_order() {
        let registry = Arc::new(PeerRegistry::new());
        let (alice, mut alice_rx) = test_peer(1, 64);
        let (bob, mut bob_rx) = test_peer(2, 64);
        registry.register(alice).await;
        registry.register(bob).await;

        let mut tasks = Vec::new();
        for i in 0u8..16 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.broadcast(Bytes::from(vec![i])).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut alice_seen = Vec::new();
        let mut bob_seen = Vec::new();
        for _ in 0..16 {
            alice_seen.push(alice_rx.recv().await.unwrap());
            bob_seen.push(bob_rx.recv().await.unwrap());
        }
        // Arrival order at the relay is arbitrary, but both members must
        // observe the same one.
        assert_eq!(alice_seen, bob_seen);
    }

    #[tokio::test]
    async fn test_concurrent_unregister_and_broadcast() {
        let registry = Arc::new(PeerRegistry::new());
        let mut receivers = Vec::new();
        for id in 0..32u64 {
            let (handle, rx) = test_peer(id, 256);
            registry.register(handle).await;
            receivers.push(rx);
        }

        let broadcaster = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for _ in 0..64 {
                    registry.broadcast(Bytes::from_static(b"x")).await;
                    tokio::task::yield_now().await;
                }
            })
        };
        let remover = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for id in (0..32u64).step_by(2) {
                    registry.unregister(id).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        broadcaster.await.unwrap();
        remover.await.unwrap();

        assert_eq!(registry.len().await, 16);
        for id in (1..32u64).step_by(2) {
            assert!(registry.contains(id).await);
        }
    }
}

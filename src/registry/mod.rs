//! Chat peer registry
//!
//! The live set of chat peer connections eligible for broadcast. Peers are
//! inserted on accept and removed on their first failed send or receive.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<PeerRegistry>
//!                  ┌────────────────────────┐
//!                  │ Mutex<HashMap<PeerId,  │
//!                  │   PeerHandle {         │
//!                  │     tx: mpsc::Sender,  │
//!                  │   }                    │
//!                  │ >>                     │
//!                  └───────────┬────────────┘
//!                              │ broadcast(frame)
//!            ┌─────────────────┼─────────────────┐
//!            ▼                 ▼                 ▼
//!       [writer task]     [writer task]     [writer task]
//!       rx.recv()         rx.recv()         rx.recv()
//!            │                 │                 │
//!            └──► write_all ──► one TCP socket each
//! ```
//!
//! # Zero-Copy Design
//!
//! `bytes::Bytes` uses reference counting, so every peer's queue holds the
//! same allocation of a broadcast frame; delivery clones a pointer, not the
//! payload.

pub mod peer;
pub mod store;

pub use peer::{DeliverError, PeerHandle, PeerId};
pub use store::PeerRegistry;

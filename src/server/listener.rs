//! Relay server orchestration
//!
//! Binds the two listeners, runs both accept loops, and exposes the
//! operator-facing handle (local broadcast, stats, frame source
//! attachment).

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::message::ChatMessage;
use crate::registry::{PeerId, PeerRegistry};
use crate::server::config::ServerConfig;
use crate::server::{chat, video};
use crate::source::{self, FrameSender, FrameSource};
use crate::stats::{RelayStats, StatsSnapshot};

/// Lifecycle notifications for the host side (the relay operator's UI)
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// A chat peer connected and was registered
    ChatPeerJoined { peer: PeerId, addr: SocketAddr },

    /// A chat peer disconnected and was unregistered
    ChatPeerLeft { peer: PeerId },

    /// A message was received and broadcast
    MessageRelayed {
        peer: PeerId,
        message: ChatMessage,
        delivered: usize,
    },

    /// A video subscriber connected
    SubscriberJoined { subscriber: PeerId, addr: SocketAddr },

    /// A video subscriber disconnected
    SubscriberLeft { subscriber: PeerId },
}

/// State shared by both accept loops and every worker task
pub(crate) struct RelayShared {
    pub(crate) config: ServerConfig,
    pub(crate) registry: PeerRegistry,
    pub(crate) frames: Arc<FrameSender>,
    pub(crate) stats: Arc<RelayStats>,
    events: mpsc::Sender<RelayEvent>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl RelayShared {
    pub(crate) fn next_session_id(&self) -> PeerId {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Try to reserve a connection slot; `None` with a configured limit
    /// means the connection must be rejected.
    pub(crate) fn try_acquire_slot(&self) -> std::result::Result<Option<OwnedSemaphorePermit>, ()> {
        match &self.connection_semaphore {
            Some(sem) => match Arc::clone(sem).try_acquire_owned() {
                Ok(permit) => Ok(Some(permit)),
                Err(_) => Err(()),
            },
            None => Ok(None),
        }
    }

    /// Surface an event without ever blocking relay work
    pub(crate) fn emit(&self, event: RelayEvent) {
        if self.events.try_send(event).is_err() {
            tracing::trace!("Relay event dropped: channel full or unconsumed");
        }
    }

    /// Frame a message and fan it out to every registered peer
    pub(crate) async fn broadcast_message(&self, message: &ChatMessage) -> usize {
        let frame = crate::codec::encode_frame(message.as_bytes());
        let delivered = self.registry.broadcast(frame).await;
        self.stats.record_message(message.as_bytes().len(), delivered);
        delivered
    }

    pub(crate) fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }
        Ok(())
    }
}

/// Chat + video relay server
///
/// Bound but not yet running; [`run`](Self::run) consumes the server and
/// drives both accept loops. Keep a [`RelayHandle`] around for operator
/// messages, stats, and frame source attachment.
pub struct RelayServer {
    shared: Arc<RelayShared>,
    chat_listener: TcpListener,
    video_listener: TcpListener,
    chat_addr: SocketAddr,
    video_addr: SocketAddr,
}

impl RelayServer {
    /// Bind both listeners.
    ///
    /// Failure to bind either port is the only globally fatal error.
    /// Returns the server and the receive side of the relay event stream.
    pub async fn bind(config: ServerConfig) -> Result<(Self, mpsc::Receiver<RelayEvent>)> {
        let chat_listener = TcpListener::bind(config.chat_addr).await?;
        let video_listener = TcpListener::bind(config.video_addr).await?;
        let chat_addr = chat_listener.local_addr()?;
        let video_addr = video_listener.local_addr()?;

        tracing::info!(chat = %chat_addr, video = %video_addr, "Relay listening");

        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        let (events_tx, events_rx) = mpsc::channel(config.event_capacity);
        let (frames, _) = source::frame_cell();

        let shared = Arc::new(RelayShared {
            config,
            registry: PeerRegistry::new(),
            frames,
            stats: Arc::new(RelayStats::new()),
            events: events_tx,
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        });

        Ok((
            Self {
                shared,
                chat_listener,
                video_listener,
                chat_addr,
                video_addr,
            },
            events_rx,
        ))
    }

    /// Actual chat listener address (useful when bound to port 0)
    pub fn chat_addr(&self) -> SocketAddr {
        self.chat_addr
    }

    /// Actual video listener address
    pub fn video_addr(&self) -> SocketAddr {
        self.video_addr
    }

    /// Operator handle, cloneable and usable after `run` consumes the server
    pub fn handle(&self) -> RelayHandle {
        RelayHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run both accept loops until the process ends.
    pub async fn run(self) -> Result<()> {
        let Self {
            shared,
            chat_listener,
            video_listener,
            ..
        } = self;

        tokio::join!(
            chat::accept_loop(Arc::clone(&shared), chat_listener),
            video::accept_loop(Arc::clone(&shared), video_listener),
        );

        Ok(())
    }

    /// Run both accept loops until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let Self {
            shared,
            chat_listener,
            video_listener,
            ..
        } = self;

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
            }
            _ = chat::accept_loop(Arc::clone(&shared), chat_listener) => {}
            _ = video::accept_loop(Arc::clone(&shared), video_listener) => {}
        }

        Ok(())
    }
}

/// Cloneable operator-side handle to a running relay
#[derive(Clone)]
pub struct RelayHandle {
    shared: Arc<RelayShared>,
}

impl RelayHandle {
    /// Broadcast a relay-originated message.
    ///
    /// Takes the identical path as a client message; the operator has no
    /// registry entry and receives nothing back. Returns the delivery
    /// count.
    pub async fn broadcast_local(&self, sender: &str, text: &str) -> usize {
        let message = ChatMessage::new(sender, text);
        let delivered = self.shared.broadcast_message(&message).await;
        tracing::debug!(delivered, "Relayed operator message");
        delivered
    }

    /// Attach a frame source, spawning the single producer task.
    ///
    /// Subscriber workers never touch the source; they read the shared
    /// latest-frame cell. If the source fails the producer exits and a
    /// replacement can be attached here.
    pub fn attach_source<S>(&self, frame_source: S) -> JoinHandle<()>
    where
        S: FrameSource,
    {
        let cell = Arc::clone(&self.shared.frames);
        let stats = Arc::clone(&self.shared.stats);
        tokio::spawn(source::run_producer(frame_source, cell, stats))
    }

    /// Point-in-time relay counters
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Number of currently registered chat peers
    pub async fn peer_count(&self) -> usize {
        self.shared.registry.len().await
    }
}

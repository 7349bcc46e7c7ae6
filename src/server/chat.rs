//! Chat relay service
//!
//! Accept side of the chat channel. Per connection: register, then a
//! framed read loop that broadcasts every received message verbatim to the
//! full registry (originator included, no self-suppression). First failed
//! receive, malformed payload, or clean EOF unregisters the peer and ends
//! its worker.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::codec::{read_frame, StreamAssembler};
use crate::error::{Error, Result};
use crate::message::ChatMessage;
use crate::registry::{PeerHandle, PeerId};
use crate::server::listener::{RelayEvent, RelayShared};

pub(crate) async fn accept_loop(shared: Arc<RelayShared>, listener: TcpListener) {
    loop {
        match listener.accept().await {
            Ok((socket, peer_addr)) => {
                handle_connection(&shared, socket, peer_addr).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to accept chat connection");
            }
        }
    }
}

async fn handle_connection(shared: &Arc<RelayShared>, socket: TcpStream, peer_addr: SocketAddr) {
    let permit = match shared.try_acquire_slot() {
        Ok(permit) => permit,
        Err(()) => {
            tracing::warn!(peer = %peer_addr, "Chat connection rejected: limit reached");
            return;
        }
    };

    if let Err(e) = shared.configure_socket(&socket) {
        tracing::error!(error = %e, "Failed to configure chat socket");
        return;
    }

    let session_id = shared.next_session_id();
    tracing::debug!(peer = session_id, addr = %peer_addr, "New chat connection");

    let (reader, writer) = socket.into_split();
    let (tx, rx) = mpsc::channel(shared.config.peer_queue_capacity);

    // The writer task is the only task that touches this socket's write
    // side; broadcasts reach it through the bounded queue.
    tokio::spawn(write_loop(session_id, writer, rx));

    shared
        .registry
        .register(PeerHandle::new(session_id, peer_addr, tx))
        .await;
    shared.stats.peer_connected();
    shared.emit(RelayEvent::ChatPeerJoined {
        peer: session_id,
        addr: peer_addr,
    });

    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        match read_loop(&shared, session_id, reader).await {
            Ok(()) => {
                tracing::debug!(peer = session_id, "Chat peer closed its write side");
            }
            Err(e) if e.is_connection_scoped() => {
                tracing::debug!(peer = session_id, error = %e, "Chat peer dropped");
            }
            Err(e) => {
                tracing::warn!(peer = session_id, error = %e, "Chat worker failed");
            }
        }

        // Removal here; the writer task then drains out and closes the
        // socket once its queue senders are gone.
        shared.registry.unregister(session_id).await;
        shared.stats.peer_disconnected();
        shared.emit(RelayEvent::ChatPeerLeft { peer: session_id });
        drop(permit);
    });
}

async fn read_loop(
    shared: &Arc<RelayShared>,
    session_id: PeerId,
    mut reader: OwnedReadHalf,
) -> Result<()> {
    let mut assembler = StreamAssembler::with_max_frame_size(shared.config.max_frame_size);
    let mut read_buf = vec![0u8; shared.config.read_buffer_size];
    let deadline = shared.config.idle_timeout;

    loop {
        let payload = match with_deadline(
            deadline,
            read_frame(&mut reader, &mut assembler, &mut read_buf),
        )
        .await?
        {
            Some(payload) => payload,
            None => return Ok(()),
        };

        // Validate, then broadcast the payload bytes untouched.
        let message = ChatMessage::from_wire(&payload)?;
        let delivered = shared.broadcast_message(&message).await;

        tracing::debug!(
            peer = session_id,
            bytes = payload.len(),
            delivered,
            "Relayed chat message"
        );
        shared.emit(RelayEvent::MessageRelayed {
            peer: session_id,
            message,
            delivered,
        });
    }
}

async fn write_loop(session_id: PeerId, mut writer: OwnedWriteHalf, mut rx: mpsc::Receiver<Bytes>) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = writer.write_all(&frame).await {
            tracing::debug!(peer = session_id, error = %e, "Chat send failed");
            // Exiting drops the receiver; the next broadcast observes the
            // closed queue and unregisters this peer.
            return;
        }
    }
    // Queue closed: the peer was unregistered. Let the peer see EOF.
    let _ = writer.shutdown().await;
}

/// Apply the configured read deadline; zero means wait forever.
async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    if deadline.is_zero() {
        fut.await
    } else {
        match tokio::time::timeout(deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::ConnectionClosed),
        }
    }
}

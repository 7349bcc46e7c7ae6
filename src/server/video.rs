//! Video relay service
//!
//! Accept side of the video channel. Each subscriber gets a dedicated
//! worker that frames and writes whatever the latest-frame cell holds,
//! then waits for the next publish. Workers never drive the frame source
//! and never affect each other; a write failure closes that subscriber
//! only.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use crate::codec::length_prefix;
use crate::error::{Error, Result};
use crate::registry::PeerId;
use crate::server::listener::{RelayEvent, RelayShared};
use crate::source::FrameReceiver;

pub(crate) async fn accept_loop(shared: Arc<RelayShared>, listener: TcpListener) {
    loop {
        match listener.accept().await {
            Ok((socket, peer_addr)) => {
                handle_connection(&shared, socket, peer_addr).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to accept video connection");
            }
        }
    }
}

async fn handle_connection(shared: &Arc<RelayShared>, socket: TcpStream, peer_addr: SocketAddr) {
    let permit = match shared.try_acquire_slot() {
        Ok(permit) => permit,
        Err(()) => {
            tracing::warn!(peer = %peer_addr, "Video connection rejected: limit reached");
            return;
        }
    };

    if let Err(e) = shared.configure_socket(&socket) {
        tracing::error!(error = %e, "Failed to configure video socket");
        return;
    }

    let session_id = shared.next_session_id();
    tracing::debug!(subscriber = session_id, addr = %peer_addr, "New video subscriber");

    let frames = shared.frames.subscribe();
    shared.stats.subscriber_connected();
    shared.emit(RelayEvent::SubscriberJoined {
        subscriber: session_id,
        addr: peer_addr,
    });

    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        match stream_loop(&shared, session_id, socket, frames).await {
            Ok(()) => {
                tracing::debug!(subscriber = session_id, "Video stream ended");
            }
            Err(e) if e.is_connection_scoped() => {
                tracing::debug!(subscriber = session_id, error = %e, "Video subscriber dropped");
            }
            Err(e) => {
                tracing::warn!(subscriber = session_id, error = %e, "Video worker failed");
            }
        }

        shared.stats.subscriber_disconnected();
        shared.emit(RelayEvent::SubscriberLeft {
            subscriber: session_id,
        });
        drop(permit);
    });
}

async fn stream_loop(
    shared: &Arc<RelayShared>,
    session_id: PeerId,
    mut socket: TcpStream,
    mut frames: FrameReceiver,
) -> Result<()> {
    let deadline = shared.config.idle_timeout;

    loop {
        // Latest frame only: anything published while a previous write was
        // in flight has already been superseded.
        let frame = frames.borrow_and_update().clone();

        if let Some(frame) = frame {
            send_framed(&mut socket, frame.data(), deadline).await?;
            shared.stats.record_frame_sent();
            tracing::trace!(
                subscriber = session_id,
                bytes = frame.len(),
                "Sent video frame"
            );
        }

        // Cell dropped means the relay itself is gone.
        if frames.changed().await.is_err() {
            return Ok(());
        }
    }
}

/// Write `prefix || payload` without copying the payload.
async fn send_framed(socket: &mut TcpStream, payload: &[u8], deadline: Duration) -> Result<()> {
    let write = async {
        socket.write_all(&length_prefix(payload.len())).await?;
        socket.write_all(payload).await?;
        Ok(())
    };

    if deadline.is_zero() {
        write.await
    } else {
        match tokio::time::timeout(deadline, write).await {
            Ok(result) => result,
            Err(_) => Err(Error::ConnectionClosed),
        }
    }
}

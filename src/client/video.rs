//! Video subscriber client
//!
//! Receive-only: connects to the video listener and reassembles the
//! length-prefixed frame stream. Every completed frame is surfaced once;
//! a partially received frame at disconnect is discarded.

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::codec::{read_frame, StreamAssembler};
use crate::error::Result;
use crate::source::VideoFrame;

use super::config::ClientConfig;

/// Events from the video connection
#[derive(Debug, Clone)]
pub enum VideoEvent {
    /// Connected to the relay
    Connected,

    /// One complete frame arrived
    Frame(VideoFrame),

    /// The relay closed the connection (or it failed)
    Disconnected,
}

/// Video stream subscriber
pub struct VideoSubscriber {
    config: ClientConfig,
    event_tx: mpsc::Sender<VideoEvent>,
    task: Option<JoinHandle<()>>,
}

impl VideoSubscriber {
    /// Create a new subscriber.
    ///
    /// Returns the subscriber and a receiver for events.
    pub fn new(config: ClientConfig) -> (Self, mpsc::Receiver<VideoEvent>) {
        let (tx, rx) = mpsc::channel(256);

        let subscriber = Self {
            config,
            event_tx: tx,
            task: None,
        };

        (subscriber, rx)
    }

    /// Connect to the video relay and start the receive loop.
    pub async fn connect(&mut self) -> Result<()> {
        let socket = TcpStream::connect(self.config.video_addr).await?;
        tracing::debug!(addr = %self.config.video_addr, "Video subscriber connected");

        let _ = self.event_tx.send(VideoEvent::Connected).await;

        self.task = Some(tokio::spawn(receive_loop(
            socket,
            self.event_tx.clone(),
            self.config.max_frame_size,
            self.config.read_buffer_size,
        )));

        Ok(())
    }

    /// Drop the connection and stop the receive loop.
    pub fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether the receive loop is still running
    pub fn is_connected(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for VideoSubscriber {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn receive_loop(
    mut socket: TcpStream,
    events: mpsc::Sender<VideoEvent>,
    max_frame_size: usize,
    read_buffer_size: usize,
) {
    let mut assembler = StreamAssembler::with_max_frame_size(max_frame_size);
    let mut read_buf = vec![0u8; read_buffer_size];

    loop {
        match read_frame(&mut socket, &mut assembler, &mut read_buf).await {
            Ok(Some(payload)) => {
                if events.send(VideoEvent::Frame(VideoFrame::new(payload))).await.is_err() {
                    return;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Video receive loop ended");
                break;
            }
        }
    }

    let _ = events.send(VideoEvent::Disconnected).await;
}

//! Chat client
//!
//! Sends named messages and receives every broadcast, including the echo
//! of its own messages (the relay does no self-suppression).

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::codec::{encode_frame, read_frame, StreamAssembler};
use crate::error::{Error, Result};
use crate::message::ChatMessage;

use super::config::ClientConfig;

/// Events from the chat connection
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Connected to the relay
    Connected,

    /// One complete broadcast message arrived
    Message(ChatMessage),

    /// The relay closed the connection (or it failed)
    Disconnected,
}

/// Chat relay client
///
/// # Example
/// ```no_run
/// use chatcast_rs::client::{ChatClient, ClientConfig};
///
/// # async fn example() -> chatcast_rs::error::Result<()> {
/// let (mut client, mut events) = ChatClient::new(ClientConfig::with_name("Alice"));
///
/// tokio::spawn(async move {
///     while let Some(event) = events.recv().await {
///         println!("Event: {:?}", event);
///     }
/// });
///
/// client.connect().await?;
/// client.send("hi").await?;
/// # Ok(())
/// # }
/// ```
pub struct ChatClient {
    config: ClientConfig,
    event_tx: mpsc::Sender<ChatEvent>,
    writer: Option<OwnedWriteHalf>,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// Returns the client and a receiver for events.
    pub fn new(config: ClientConfig) -> (Self, mpsc::Receiver<ChatEvent>) {
        let (tx, rx) = mpsc::channel(256);

        let client = Self {
            config,
            event_tx: tx,
            writer: None,
        };

        (client, rx)
    }

    /// Connect to the chat relay and start the receive loop.
    pub async fn connect(&mut self) -> Result<()> {
        let socket = TcpStream::connect(self.config.chat_addr).await?;
        tracing::debug!(addr = %self.config.chat_addr, "Chat client connected");

        let (reader, writer) = socket.into_split();
        self.writer = Some(writer);
        let _ = self.event_tx.send(ChatEvent::Connected).await;

        tokio::spawn(receive_loop(
            reader,
            self.event_tx.clone(),
            self.config.max_frame_size,
            self.config.read_buffer_size,
        ));

        Ok(())
    }

    /// Send a message under the configured display name.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        let message = ChatMessage::new(&self.config.name, text);
        self.send_message(&message).await
    }

    /// Send an already-formatted message.
    ///
    /// One logical message is one transport write.
    pub async fn send_message(&mut self, message: &ChatMessage) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::ConnectionClosed)?;
        writer.write_all(&encode_frame(message.as_bytes())).await?;
        Ok(())
    }

    /// Close the connection.
    ///
    /// Dropping the write half sends FIN; the relay unregisters this peer
    /// within one receive cycle.
    pub async fn disconnect(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.shutdown().await;
        }
    }

    /// Whether the client currently holds an open write side
    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }
}

async fn receive_loop(
    mut reader: OwnedReadHalf,
    events: mpsc::Sender<ChatEvent>,
    max_frame_size: usize,
    read_buffer_size: usize,
) {
    let mut assembler = StreamAssembler::with_max_frame_size(max_frame_size);
    let mut read_buf = vec![0u8; read_buffer_size];

    loop {
        match read_frame(&mut reader, &mut assembler, &mut read_buf).await {
            Ok(Some(payload)) => match ChatMessage::from_wire(&payload) {
                Ok(message) => {
                    if events.send(ChatEvent::Message(message)).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed chat payload, closing");
                    break;
                }
            },
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Chat receive loop ended");
                break;
            }
        }
    }

    let _ = events.send(ChatEvent::Disconnected).await;
}

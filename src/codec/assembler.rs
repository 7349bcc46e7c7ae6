//! Frame reassembly (receive side)
//!
//! State machine over a byte stream:
//!
//! ```text
//! AwaitLength --(8 length bytes buffered)--> AwaitPayload
//! AwaitPayload --(payload bytes buffered)--> deliver, back to AwaitLength
//! ```
//!
//! Bytes beyond the current frame always carry forward, so one read may
//! complete several frames and the tail of a read may open the next one.
//! A zero-length read at any point means the peer closed its write side;
//! nothing partially buffered is ever delivered.

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec::framing::LENGTH_PREFIX_LEN;
use crate::error::{Error, Result};

/// Default cap on a single frame, shared by both relay channels
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Accumulating the 8-byte length prefix
    AwaitLength,
    /// Accumulating `len` payload bytes
    AwaitPayload { len: usize },
}

/// Reassembles length-prefixed frames from arbitrarily segmented reads.
///
/// Feed raw bytes in with [`extend`](Self::extend), drain complete frames
/// with [`next_payload`](Self::next_payload). The async [`read_frame`]
/// helper drives this directly from a socket.
#[derive(Debug)]
pub struct StreamAssembler {
    buf: BytesMut,
    state: State,
    max_frame_size: usize,
}

impl StreamAssembler {
    /// Create an assembler with the default frame size limit
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create an assembler with a custom frame size limit
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(4 * 1024),
            state: State::AwaitLength,
            max_frame_size,
        }
    }

    /// Append received bytes to the internal buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Number of bytes buffered but not yet delivered
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Extract the next complete payload, if one is buffered.
    ///
    /// Returns `Ok(None)` when more bytes are needed. A declared length
    /// beyond the configured limit is a protocol violation; the caller is
    /// expected to drop the connection.
    pub fn next_payload(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.state {
                State::AwaitLength => {
                    if self.buf.len() < LENGTH_PREFIX_LEN {
                        return Ok(None);
                    }
                    let declared = self.buf.get_u64_le();
                    if declared > self.max_frame_size as u64 {
                        return Err(Error::FrameTooLarge {
                            declared,
                            max: self.max_frame_size,
                        });
                    }
                    self.state = State::AwaitPayload {
                        len: declared as usize,
                    };
                }
                State::AwaitPayload { len } => {
                    if self.buf.len() < len {
                        return Ok(None);
                    }
                    let payload = self.buf.split_to(len).freeze();
                    self.state = State::AwaitLength;
                    return Ok(Some(payload));
                }
            }
        }
    }
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one complete frame from `reader`, buffering through `assembler`.
///
/// Returns `Ok(None)` when the peer closes its write side between frames
/// (or mid-frame; a partial frame is discarded, never delivered). Short
/// reads are retried here and never surfaced to the caller.
pub async fn read_frame<R>(
    reader: &mut R,
    assembler: &mut StreamAssembler,
    read_buf: &mut [u8],
) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    loop {
        if let Some(payload) = assembler.next_payload()? {
            return Ok(Some(payload));
        }

        let n = reader.read(read_buf).await?;
        if n == 0 {
            return Ok(None);
        }
        assembler.extend(&read_buf[..n]);
    }
}

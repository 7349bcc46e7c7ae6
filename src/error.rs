//! Crate error types
//!
//! One taxonomy for both halves of the relay. Worker-level errors
//! (`ConnectionClosed`, the serialization variants) terminate a single
//! connection and are never propagated past its task; only a failed
//! listener bind at startup is fatal to the relay as a whole.

use std::io;

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for relay operations
#[derive(Debug)]
pub enum Error {
    /// Underlying socket I/O failed (includes listener bind failures)
    Io(io::Error),

    /// Peer closed its write side or reset the connection
    ConnectionClosed,

    /// A declared frame length exceeds the caller-imposed limit
    FrameTooLarge { declared: u64, max: usize },

    /// Chat payload was not valid UTF-8
    InvalidUtf8(std::str::Utf8Error),

    /// The frame source cannot produce (device busy, capture failed)
    SourceUnavailable(String),
}

impl Error {
    /// Whether this error only ends the affected connection's worker.
    ///
    /// Expected teardown (`ConnectionClosed`) and per-connection
    /// serialization failures fall in this bucket.
    pub fn is_connection_scoped(&self) -> bool {
        matches!(
            self,
            Error::ConnectionClosed | Error::FrameTooLarge { .. } | Error::InvalidUtf8(_)
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::ConnectionClosed => write!(f, "connection closed by peer"),
            Error::FrameTooLarge { declared, max } => {
                write!(f, "frame of {} bytes exceeds limit of {}", declared, max)
            }
            Error::InvalidUtf8(e) => write!(f, "chat payload is not valid UTF-8: {}", e),
            Error::SourceUnavailable(reason) => {
                write!(f, "frame source unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::InvalidUtf8(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        // Resets and aborted reads are the normal end of a peer's life,
        // not an I/O fault worth surfacing separately.
        match e.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => Error::ConnectionClosed,
            _ => Error::Io(e),
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(e: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8(e)
    }
}

//! Length-prefixed message framing
//!
//! TCP is a byte stream with no message boundaries: a single read may carry
//! a fraction of one logical message or several messages back to back. Both
//! relay channels therefore wrap every payload the same way:
//!
//! ```text
//! FRAME := LENGTH (8 bytes, unsigned, little-endian) || PAYLOAD (LENGTH bytes)
//! ```
//!
//! [`framing`] holds the send side (prefix a payload), [`assembler`] the
//! receive side (a state machine that reassembles frames from arbitrarily
//! segmented reads). The codec itself imposes no payload size limit; the
//! assembler enforces whatever limit its caller configures.

pub mod assembler;
pub mod framing;

pub use assembler::{read_frame, StreamAssembler};
pub use framing::{encode_frame, length_prefix, LENGTH_PREFIX_LEN};

//! Frame encoding (send side)

use bytes::{BufMut, Bytes, BytesMut};

/// Width of the length prefix in bytes
pub const LENGTH_PREFIX_LEN: usize = 8;

/// Build the length prefix for a payload of `len` bytes.
///
/// Useful when the payload is large and already lives in its own buffer:
/// write the prefix, then the payload, without copying the payload into a
/// contiguous frame.
pub fn length_prefix(len: usize) -> [u8; LENGTH_PREFIX_LEN] {
    (len as u64).to_le_bytes()
}

/// Encode a payload into a single contiguous frame.
///
/// Output length is always `LENGTH_PREFIX_LEN + payload.len()`. Payloads of
/// `2^64` bytes or more are not representable, which no in-memory buffer
/// reaches.
pub fn encode_frame(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_LEN + payload.len());
    buf.put_u64_le(payload.len() as u64);
    buf.put_slice(payload);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_prepends_length() {
        let frame = encode_frame(b"hello");
        assert_eq!(frame.len(), LENGTH_PREFIX_LEN + 5);
        assert_eq!(&frame[..LENGTH_PREFIX_LEN], &5u64.to_le_bytes());
        assert_eq!(&frame[LENGTH_PREFIX_LEN..], b"hello");
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = encode_frame(b"");
        assert_eq!(frame.len(), LENGTH_PREFIX_LEN);
        assert_eq!(&frame[..], &0u64.to_le_bytes());
    }

    #[test]
    fn test_length_prefix_matches_encode() {
        let payload = vec![0xAB; 300];
        let frame = encode_frame(&payload);
        assert_eq!(&frame[..LENGTH_PREFIX_LEN], &length_prefix(payload.len()));
    }
}

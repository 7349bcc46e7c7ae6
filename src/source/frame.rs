//! Opaque video frame type

use bytes::Bytes;

/// One serialized video frame.
///
/// The relay never interprets the contents; the serialization scheme (pixel
/// array, shape metadata, compression) is an agreement between the frame
/// source and the renderer. Cheap to clone via `Bytes` reference counting,
/// which is what makes fan-out to N subscribers O(1) in payload size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    data: Bytes,
}

impl VideoFrame {
    /// Wrap serialized frame data
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Serialized length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the frame carries no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The serialized bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the frame, returning its bytes
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl From<Bytes> for VideoFrame {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for VideoFrame {
    fn from(data: Vec<u8>) -> Self {
        Self { data: data.into() }
    }
}

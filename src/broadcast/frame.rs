//! Frame type shared between the demuxer and the broadcaster
//!
//! A frame is one complete encoded JPEG image. It is immutable after
//! creation and designed to be cheap to clone: the bytes are reference
//! counted, so every streaming client shares the same allocation.

use bytes::Bytes;

/// One complete encoded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Encoded image bytes (zero-copy via reference counting)
    pub data: Bytes,
}

impl Frame {
    /// Create a frame from encoded bytes
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    /// Byte length of the encoded image
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the frame carries no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Bytes> for Frame {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

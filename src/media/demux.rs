//! JPEG frame demuxer
//!
//! The encoder produces JPEG images back to back with no framing of its
//! own. Each encoder write that starts a new image begins with the JPEG
//! start-of-image marker, so a chunk whose first two bytes are the marker
//! means "everything accumulated so far is a complete frame". The marker
//! is used purely as a boundary delimiter; the demuxer does not validate
//! JPEG structure and has no error path — a stream that never shows a
//! second marker simply completes no frame.

use bytes::BytesMut;

use crate::broadcast::Frame;

/// JPEG start-of-image marker
pub const SOI_MARKER: [u8; 2] = [0xFF, 0xD8];

/// Splits a continuous JPEG byte stream into complete frames
///
/// Feed it the encoder's output chunks in production order; a returned
/// frame holds exactly the bytes accumulated between two marker-starting
/// chunks. K marker-starting chunks yield K-1 frames.
#[derive(Debug, Default)]
pub struct FrameDemuxer {
    buffer: BytesMut,
}

impl FrameDemuxer {
    /// Create a demuxer with an empty accumulation buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk of encoder output
    ///
    /// Returns the completed frame when `chunk` starts a new image and
    /// bytes were accumulated before it. The chunk's own bytes are always
    /// appended to the accumulation buffer, marker or not.
    pub fn ingest(&mut self, chunk: &[u8]) -> Option<Frame> {
        let completed = if chunk.starts_with(&SOI_MARKER) && !self.buffer.is_empty() {
            Some(Frame::new(self.buffer.split().freeze()))
        } else {
            None
        };

        self.buffer.extend_from_slice(chunk);
        completed
    }

    /// Bytes accumulated toward the frame in progress
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}

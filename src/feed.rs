//! Encoder feed pump
//!
//! Bridges the external JPEG encoder to the broadcaster: read a chunk,
//! run it through the demuxer, publish any completed frame. The encoder
//! itself (camera pipeline, child process, file) is outside this crate;
//! anything implementing `AsyncRead` works.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::broadcast::FrameBroadcaster;
use crate::error::Result;
use crate::media::FrameDemuxer;

/// Pump the encoder's byte stream into the broadcaster
///
/// Runs until the reader returns EOF or an error. On EOF the last
/// published frame stays current, so connected clients keep the most
/// recent image until the process is torn down or a new feed starts.
pub async fn pump<R>(
    mut reader: R,
    broadcaster: Arc<FrameBroadcaster>,
    buffer_size: usize,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut demuxer = FrameDemuxer::new();
    let mut buf = vec![0u8; buffer_size];
    let mut published = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            tracing::info!(frames = published, "Encoder feed ended");
            return Ok(());
        }

        if let Some(frame) = demuxer.ingest(&buf[..n]) {
            tracing::trace!(bytes = frame.len(), "Frame published");
            broadcaster.publish(frame).await;
            published += 1;
        }
    }
}

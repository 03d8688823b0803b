//! Serve a prerecorded MJPEG file in a loop
//!
//! Run with: cargo run --example file_feed <FILE> [BIND_ADDR]
//!
//! Useful for testing viewers without a camera. Produce a suitable file
//! with:
//!
//!   ffmpeg -i input.mp4 -vf fps=15 -f mjpeg recording.mjpg
//!
//! The file is replayed from the start whenever it runs out, with a short
//! inter-frame pause so clients see motion rather than a burst.

use std::time::Duration;

use tokio::fs::File;
use tokio::io::AsyncReadExt;

use mjpeg_relay::media::SOI_MARKER;
use mjpeg_relay::{Frame, ServerConfig, StreamServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let path = match args.get(1) {
        Some(path) => path.clone(),
        None => {
            eprintln!("Usage: file_feed <FILE> [BIND_ADDR]");
            std::process::exit(1);
        }
    };
    let bind_addr = args
        .get(2)
        .map(|a| a.parse())
        .transpose()?
        .unwrap_or_else(|| "0.0.0.0:8000".parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mjpeg_relay=debug".parse()?),
        )
        .init();

    let mut data = Vec::new();
    File::open(&path).await?.read_to_end(&mut data).await?;
    let frames = split_frames(&data);
    if frames.is_empty() {
        return Err(format!("No JPEG frames found in {}", path).into());
    }
    println!("Loaded {} frames from {}", frames.len(), path);

    let server = StreamServer::new(ServerConfig::with_addr(bind_addr));

    // Replay loop publishes straight to the broadcaster; no demuxer needed
    // since the file is split up front.
    let broadcaster = server.broadcaster().clone();
    let replay = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(66));
        loop {
            for frame in &frames {
                ticker.tick().await;
                broadcaster.publish(frame.clone()).await;
            }
        }
    });

    println!("Streaming on http://localhost:{}/", bind_addr.port());

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let result = server.run_until(shutdown).await;
    replay.abort();
    Ok(result?)
}

/// Split a recorded MJPEG file into frames on SOI boundaries.
fn split_frames(data: &[u8]) -> Vec<Frame> {
    let mut starts: Vec<usize> = Vec::new();
    for i in 0..data.len().saturating_sub(1) {
        if data[i..i + 2] == SOI_MARKER {
            starts.push(i);
        }
    }

    let mut frames = Vec::with_capacity(starts.len());
    for window in starts.windows(2) {
        frames.push(Frame::new(bytes::Bytes::copy_from_slice(
            &data[window[0]..window[1]],
        )));
    }
    if let Some(&last) = starts.last() {
        frames.push(Frame::new(bytes::Bytes::copy_from_slice(&data[last..])));
    }
    frames
}

//! Live MJPEG-over-HTTP relay
//!
//! One producer feeds a continuous raw JPEG byte stream in; any number of
//! HTTP clients each receive whatever frame is currently latest as a
//! never-ending `multipart/x-mixed-replace` response.
//!
//! # Architecture
//!
//! ```text
//! encoder bytes ──► FrameDemuxer ──► FrameBroadcaster.publish
//!                                          │
//!                          ┌───────────────┼───────────────┐
//!                          ▼               ▼               ▼
//!                    [Connection]    [Connection]    [Connection]
//!                    wait_next ──► multipart part ──► TCP
//! ```
//!
//! The broadcaster retains only the latest frame: slow clients skip
//! intermediate frames instead of queuing them, and the producer never
//! blocks on a client.
//!
//! # Example
//!
//! ```no_run
//! use mjpeg_relay::{ServerConfig, StreamServer};
//!
//! #[tokio::main]
//! async fn main() -> mjpeg_relay::Result<()> {
//!     let server = StreamServer::new(ServerConfig::default());
//!     let shutdown = async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     };
//!     server.run_with_feed(tokio::io::stdin(), shutdown).await
//! }
//! ```

pub mod broadcast;
pub mod error;
pub mod feed;
pub mod http;
pub mod media;
pub mod server;

pub use broadcast::{Frame, FrameBroadcaster};
pub use error::{Error, Result};
pub use media::FrameDemuxer;
pub use server::{Connection, ConnectionPhase, ServerConfig, StreamServer};

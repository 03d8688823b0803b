//! Latest-frame broadcast
//!
//! One producer publishes frames, any number of streaming clients wait for
//! the next one. Only the most recent frame is retained.
//!
//! # Architecture
//!
//! ```text
//!                    Arc<FrameBroadcaster>
//!                 ┌───────────────────────┐
//!                 │ latest: Mutex<{       │
//!                 │   frame: Option<Frame>│
//!                 │   generation: u64     │
//!                 │ }>                    │
//!                 │ publish_wake: Notify  │
//!                 └──────────┬────────────┘
//!                            │
//!        ┌───────────────────┼───────────────────┐
//!        │                   │                   │
//!        ▼                   ▼                   ▼
//!   [Producer]          [Client]            [Client]
//!   publish(frame)      wait_next(g)        wait_next(g)
//! ```
//!
//! `bytes::Bytes` is reference counted, so every client returned the same
//! frame shares one allocation.

pub mod frame;
pub mod latest;

pub use frame::Frame;
pub use latest::FrameBroadcaster;

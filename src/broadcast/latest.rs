//! Latest-frame broadcaster
//!
//! Latest-wins publish/subscribe: exactly one frame is current at any
//! instant, a publish replaces it and wakes every waiter, and a consumer
//! that falls behind simply skips to whatever is current the next time it
//! asks. There is no queue and no history, so a slow client can never
//! cause unbounded memory growth or stall the producer.

use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use super::frame::Frame;

/// Shared broadcast state: the current frame and its generation
#[derive(Debug, Default)]
struct Latest {
    frame: Option<Frame>,
    generation: u64,
}

/// Single-slot broadcast of the most recent frame
///
/// The lock is held only for the store or read of the frame handle and
/// generation counter, never across a socket write. `publish` never blocks
/// on consumers and never fails.
#[derive(Debug, Default)]
pub struct FrameBroadcaster {
    latest: Mutex<Latest>,
    publish_wake: Notify,
}

impl FrameBroadcaster {
    /// Create a broadcaster with no current frame (generation 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a broadcaster behind a shared handle
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Replace the current frame and wake every waiter
    ///
    /// The previous frame is dropped; consumers mid-write pick up the new
    /// one on their next [`wait_next`](Self::wait_next) call.
    pub async fn publish(&self, frame: Frame) {
        {
            let mut latest = self.latest.lock().await;
            latest.frame = Some(frame);
            latest.generation += 1;
        }
        self.publish_wake.notify_waiters();
    }

    /// Wait until the current frame is newer than `last_seen`
    ///
    /// Returns immediately if a newer frame is already current, otherwise
    /// suspends until the next publish. The returned generation is the
    /// value to pass on the next call.
    pub async fn wait_next(&self, last_seen: u64) -> (Frame, u64) {
        let notified = self.publish_wake.notified();
        tokio::pin!(notified);

        loop {
            // Register for wakeup before checking, so a publish landing
            // between the check and the await is never lost.
            notified.as_mut().enable();

            {
                let latest = self.latest.lock().await;
                if latest.generation > last_seen {
                    if let Some(frame) = &latest.frame {
                        return (frame.clone(), latest.generation);
                    }
                }
            }

            notified.as_mut().await;
            notified.set(self.publish_wake.notified());
        }
    }

    /// Non-blocking snapshot of the current frame and generation
    pub async fn latest(&self) -> (Option<Frame>, u64) {
        let latest = self.latest.lock().await;
        (latest.frame.clone(), latest.generation)
    }

    /// Current generation counter
    pub async fn generation(&self) -> u64 {
        self.latest.lock().await.generation
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;

    use super::*;

    fn frame(byte: u8, len: usize) -> Frame {
        Frame::new(Bytes::from(vec![byte; len]))
    }

    #[tokio::test]
    async fn test_publish_advances_generation() {
        let b = FrameBroadcaster::new();
        assert_eq!(b.generation().await, 0);

        b.publish(frame(1, 8)).await;
        assert_eq!(b.generation().await, 1);

        b.publish(frame(2, 8)).await;
        assert_eq!(b.generation().await, 2);
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_newer() {
        let b = FrameBroadcaster::new();
        b.publish(frame(7, 4)).await;

        // Generation 1 > 0, so this must not block.
        let (f, generation) = b.wait_next(0).await;
        assert_eq!(f, frame(7, 4));
        assert_eq!(generation, 1);
    }

    #[tokio::test]
    async fn test_single_publish_wakes_all_waiters() {
        let b = FrameBroadcaster::shared();

        let mut waiters = Vec::new();
        for _ in 0..8 {
            let b = Arc::clone(&b);
            waiters.push(tokio::spawn(async move { b.wait_next(0).await }));
        }

        // Let the waiters park before publishing.
        tokio::time::sleep(Duration::from_millis(20)).await;
        b.publish(frame(9, 16)).await;

        for waiter in waiters {
            let (f, generation) = waiter.await.unwrap();
            assert_eq!(f, frame(9, 16));
            assert!(generation > 0);
        }
    }

    #[tokio::test]
    async fn test_latest_wins_over_intermediate_frames() {
        let b = FrameBroadcaster::new();

        b.publish(frame(1, 4)).await;
        b.publish(frame(2, 4)).await;

        // A waiter arriving after both publishes sees only the second.
        let (f, generation) = b.wait_next(0).await;
        assert_eq!(f, frame(2, 4));
        assert_eq!(generation, 2);
    }

    #[tokio::test]
    async fn test_waiter_blocks_until_first_publish() {
        let b = FrameBroadcaster::shared();

        let waiter = {
            let b = Arc::clone(&b);
            tokio::spawn(async move { b.wait_next(0).await })
        };

        // No frame yet, the waiter must still be parked.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        b.publish(frame(5, 2)).await;
        let (f, _) = waiter.await.unwrap();
        assert_eq!(f, frame(5, 2));
    }

    #[tokio::test]
    async fn test_latest_snapshot() {
        let b = FrameBroadcaster::new();
        assert_eq!(b.latest().await, (None, 0));

        b.publish(frame(3, 3)).await;
        assert_eq!(b.latest().await, (Some(frame(3, 3)), 1));
    }
}

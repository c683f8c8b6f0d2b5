use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Cloneable stop signal for [`FrameScheduler::run`].
///
/// Cancelling any clone cancels all of them. Cancellation is permanent.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // the sender lives as long as self, so this only returns on cancel
        _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

/// Runs a synchronous per-frame callback at a fixed cadence until cancelled.
///
/// Ticks that are missed because a frame took too long are skipped, so a slow
/// frame never causes a burst of catch-up frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameScheduler {
    period: Duration,
}

impl FrameScheduler {
    /// Periods shorter than 1ns are raised to 1ns.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_nanos(1)),
        }
    }

    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Calls `frame` once per tick.
    ///
    /// Stops before the next tick once `token` is cancelled, or as soon as `frame`
    /// returns an error, which is passed through. Returns the number of completed frames.
    pub async fn run<F>(&self, token: CancellationToken, mut frame: F) -> anyhow::Result<u64>
    where
        F: FnMut(u64) -> anyhow::Result<()>,
    {
        let mut interval = time::interval_at(Instant::now(), self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut frames = 0;
        debug!(period = ?self.period, "Frame scheduler started");
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    if token.is_cancelled() {
                        break;
                    }
                    frame(frames)?;
                    frames += 1;
                }
            }
        }
        info!("Frame scheduler stopped after {} frames", frames);
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_reaches_every_clone() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        handle.await.unwrap();
    }
}

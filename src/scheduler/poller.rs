//! Interval poller
//!
//! Fetches a slice immediately and then once per interval. The background
//! task keeps only a weak reference to its slice, so it never extends the
//! slice's lifetime and exits on its own once the slice is gone.

use async_trait::async_trait;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::{Keyed, SliceKind};
use crate::slice::{FetchOutcome, Slice};

/// Anything a poller can refresh
#[async_trait]
pub trait Refresh: Send + Sync + 'static {
    fn kind(&self) -> SliceKind;

    async fn refresh(&self) -> FetchOutcome;
}

#[async_trait]
impl<T> Refresh for Slice<T>
where
    T: Keyed + Clone + Send + Sync + 'static,
{
    fn kind(&self) -> SliceKind {
        Slice::kind(self)
    }

    async fn refresh(&self) -> FetchOutcome {
        self.fetch().await
    }
}

/// Starts interval pollers
pub struct Poller;

impl Poller {
    /// Poll `target` every `interval`, starting now
    pub fn start<R: Refresh>(target: &Arc<R>, interval: Duration) -> PollHandle {
        let kind = target.kind();
        let weak: Weak<R> = Arc::downgrade(target);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A slow gateway should not cause a burst of catch-up fetches
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let Some(target) = weak.upgrade() else {
                    tracing::debug!(slice = %kind, "Slice dropped, poller exiting");
                    break;
                };

                tracing::trace!(slice = %kind, "Scheduled refresh");
                target.refresh().await;
            }
        });

        tracing::info!(slice = %kind, interval_secs = interval.as_secs_f64(), "Polling started");

        PollHandle {
            kind,
            interval,
            task: Some(task),
        }
    }
}

/// Ownership of one running poller
///
/// Dropping the handle stops polling.
pub struct PollHandle {
    kind: SliceKind,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn kind(&self) -> SliceKind {
        self.kind
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Cancel the timer
    ///
    /// A fetch already in flight is abandoned once the runtime drops the task,
    /// and the slice reads as it did before that fetch started.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(slice = %self.kind, "Polling stopped");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

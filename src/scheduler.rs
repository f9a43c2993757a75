//! Deferred continuations with cooperative cancellation.
//!
//! Lifecycle progression is modeled as continuations scheduled after a
//! delay rather than as parallel execution. Each continuation carries a
//! cancellation token; `cancel_all` makes every outstanding continuation
//! a no-op, which is what lets a caller discard a run without stale
//! state mutations firing afterwards.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to one scheduled continuation.
#[derive(Debug)]
struct ScheduledTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Schedules delayed continuations on the tokio runtime.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Mutex<Vec<ScheduledTask>>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `continuation` to run after `delay`.
    ///
    /// Returns the continuation's cancellation token. A continuation
    /// whose token is cancelled before the delay elapses never runs.
    pub fn schedule<F>(&self, delay: Duration, continuation: F) -> CancellationToken
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                // Cancellation wins when both branches are ready.
                biased;
                () = token.cancelled() => {
                    debug!("scheduled continuation cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    if token.is_cancelled() {
                        return;
                    }
                    continuation.await;
                }
            }
        });

        let token = cancel.clone();
        self.tasks
            .lock()
            .expect("scheduler lock poisoned")
            .push(ScheduledTask { cancel, handle });
        token
    }

    /// Cancels every outstanding continuation.
    pub fn cancel_all(&self) {
        let tasks = self.tasks.lock().expect("scheduler lock poisoned");
        for task in tasks.iter() {
            task.cancel.cancel();
        }
    }

    /// Whether no continuations are tracked at all.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tasks.lock().expect("scheduler lock poisoned").is_empty()
    }

    /// Number of continuations that have not yet finished.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks
            .lock()
            .expect("scheduler lock poisoned")
            .iter()
            .filter(|t| !t.handle.is_finished())
            .count()
    }

    /// Awaits every scheduled continuation, cancelled or not, and
    /// forgets them.
    ///
    /// Used by drivers that want the whole staged timeline to settle
    /// before reading results.
    pub async fn drain(&self) {
        let tasks: Vec<ScheduledTask> = std::mem::take(
            &mut *self.tasks.lock().expect("scheduler lock poisoned"),
        );
        for task in tasks {
            // A cancelled task resolves promptly; a panicked one is
            // surfaced to the caller's test harness via the join error log.
            if let Err(err) = task.handle.await {
                debug!(%err, "scheduled continuation join failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn continuation_runs_after_delay() {
        let scheduler = Scheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        scheduler.schedule(Duration::from_secs(2), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::advance(Duration::from_millis(1500)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        scheduler.drain().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_continuation_is_a_noop() {
        let scheduler = Scheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        scheduler.schedule(Duration::from_secs(2), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.cancel_all();
        tokio::time::advance(Duration::from_secs(5)).await;
        scheduler.drain().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_leaves_new_schedules_usable() {
        let scheduler = Scheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        scheduler.schedule(Duration::from_secs(1), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel_all();

        let counter = Arc::clone(&fired);
        scheduler.schedule(Duration::from_secs(1), async move {
            counter.fetch_add(10, Ordering::SeqCst);
        });

        tokio::time::advance(Duration::from_secs(2)).await;
        scheduler.drain().await;
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn individual_token_cancels_only_its_task() {
        let scheduler = Scheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        let token = scheduler.schedule(Duration::from_secs(1), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&fired);
        scheduler.schedule(Duration::from_secs(1), async move {
            counter.fetch_add(10, Ordering::SeqCst);
        });

        token.cancel();
        tokio::time::advance(Duration::from_secs(2)).await;
        scheduler.drain().await;
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }
}

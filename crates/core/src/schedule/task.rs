//! Cancellable periodic task.

use std::future::Future;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A job run on a fixed interval until cancelled.
///
/// The task owns a child of the caller's token: cancelling the parent stops
/// every task spawned from it, while [`ScheduledTask::cancel`] stops only this
/// one. A run already in progress completes before the loop exits.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawns `job` to run now and then every `interval`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(
        name: &'static str,
        interval: Duration,
        parent: &CancellationToken,
        mut job: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = parent.child_token();
        let shutdown = token.clone();

        let handle = tokio::spawn(async move {
            info!(task = name, interval_secs = interval.as_secs(), "Scheduled task started");

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => job().await,
                }
            }

            info!(task = name, "Scheduled task stopped");
        });

        Self {
            name,
            token,
            handle,
        }
    }

    /// Task name used in logs.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Requests the task to stop.
    pub fn cancel(&self) {
        info!(task = self.name, "Scheduled task cancellation requested");
        self.token.cancel();
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns true once the task loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the task loop to exit.
    pub async fn join(self) -> Result<(), JoinError> {
        self.handle.await
    }

    /// Cancels the task and waits for it to exit.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.cancel();
        self.join().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn counting_job(counter: &Arc<AtomicU32>) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_on_every_interval() {
        let runs = Arc::new(AtomicU32::new(0));
        let parent = CancellationToken::new();
        let task = ScheduledTask::spawn("test", Duration::from_secs(10), &parent, counting_job(&runs));

        // Ticks at 0s, 10s and 20s.
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        task.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_further_runs() {
        let runs = Arc::new(AtomicU32::new(0));
        let parent = CancellationToken::new();
        let task = ScheduledTask::spawn("test", Duration::from_secs(10), &parent, counting_job(&runs));

        tokio::time::sleep(Duration::from_secs(15)).await;
        task.cancel();
        assert!(task.is_cancelled());
        task.join().await.unwrap();

        let after_cancel = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_cancel);
        assert_eq!(after_cancel, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancellation_stops_all_children() {
        let parent = CancellationToken::new();
        let first = ScheduledTask::spawn(
            "first",
            Duration::from_secs(5),
            &parent,
            counting_job(&Arc::new(AtomicU32::new(0))),
        );
        let second = ScheduledTask::spawn(
            "second",
            Duration::from_secs(7),
            &parent,
            counting_job(&Arc::new(AtomicU32::new(0))),
        );

        parent.cancel();

        first.join().await.unwrap();
        second.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelling_child_leaves_parent_running() {
        let parent = CancellationToken::new();
        let task = ScheduledTask::spawn(
            "child",
            Duration::from_secs(5),
            &parent,
            counting_job(&Arc::new(AtomicU32::new(0))),
        );

        task.shutdown().await.unwrap();
        assert!(!parent.is_cancelled());
    }
}

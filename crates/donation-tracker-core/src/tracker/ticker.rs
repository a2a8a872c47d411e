//! Owned periodic task handle.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A running periodic callback.
///
/// The task lives exactly as long as the handle: [`stop`](Self::stop)
/// consumes it, and dropping an unstopped handle aborts the task.
#[derive(Debug)]
pub struct TickerHandle {
    task: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Spawn `on_tick` on the current tokio runtime, firing immediately and
    /// then every `period`. Ticks missed while the runtime was stalled are
    /// skipped, not replayed.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                on_tick();
            }
        });
        tracing::debug!(?period, "ticker started");
        Self { task: Some(task) }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the ticker and wait for the task to wind down.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // A cancelled JoinError is the expected outcome here.
            let _ = task.await;
            tracing::debug!("ticker stopped");
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

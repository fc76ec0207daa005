//! Cancellable periodic task.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs a callback every `period` until cancelled or the callback breaks.
///
/// The callback receives the ticker's token so it can check for
/// cancellation again after acquiring whatever lock guards its state.
/// Dropping the `Ticker` cancels it.
pub struct Ticker {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<F, Fut>(period: Duration, token: CancellationToken, mut on_tick: F) -> Self
    where
        F: FnMut(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                if task_token.is_cancelled() {
                    break;
                }

                if on_tick(task_token.clone()).await.is_break() {
                    break;
                }
            }

            debug!("Ticker stopped");
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels and waits for the task to exit.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

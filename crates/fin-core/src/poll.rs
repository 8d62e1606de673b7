//! Periodic fetching while a query is active.
//!
//! Each started loop owns a fresh task and a fresh channel. Stopping or
//! restarting aborts the task and drops the receiver, so a batch fetched for
//! an old query can never be observed afterwards.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use fin_types::SearchResult;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::provider::ResultProvider;

/// Handle to the running poll task, if any
#[derive(Debug, Default)]
pub struct PollLoop {
    active: Option<ActivePoll>,
}

#[derive(Debug)]
struct ActivePoll {
    task: JoinHandle<()>,
    batches: mpsc::Receiver<Vec<SearchResult>>,
}

impl Drop for ActivePoll {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl PollLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit `query` and start fetching every `interval`, replacing any
    /// running loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<P: ResultProvider>(&mut self, provider: Arc<P>, query: String, interval: Duration) {
        self.stop();

        // Capacity 1 keeps at most one fetched batch waiting on the session
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(poll_task(provider, query, interval, tx));
        self.active = Some(ActivePoll { task, batches: rx });
    }

    /// Cancel the running loop. Undelivered batches are dropped with it.
    pub fn stop(&mut self) {
        if self.active.take().is_some() {
            debug!("Poll loop stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Wait for the next fetched batch.
    ///
    /// Pends forever while no loop is running, which makes it safe to use as
    /// a `select!` branch. Cancel safe.
    pub async fn next_batch(&mut self) -> Vec<SearchResult> {
        loop {
            let Some(active) = self.active.as_mut() else {
                return future::pending().await;
            };
            let received = active.batches.recv().await;
            match received {
                Some(batch) => return batch,
                None => {
                    debug!("Poll task ended on its own");
                    self.active = None;
                }
            }
        }
    }
}

async fn poll_task<P: ResultProvider>(
    provider: Arc<P>,
    query: String,
    period: Duration,
    batches: mpsc::Sender<Vec<SearchResult>>,
) {
    if let Err(e) = provider.submit_query(&query).await {
        warn!("Failed to submit query {query:?}: {e}");
    }

    let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!("Poll loop started for {query:?} every {period:?}");

    loop {
        ticks.tick().await;
        match provider.fetch_results().await {
            Ok(batch) => {
                if batches.send(batch).await.is_err() {
                    break;
                }
            }
            // Previous results stay; the next tick retries
            Err(e) => warn!("Failed to fetch results for {query:?}: {e}"),
        }
    }
}

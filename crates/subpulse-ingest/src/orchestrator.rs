//! Bounded fan-out of fetch runs across sources.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future;
use futures::stream::{self, StreamExt};
use subpulse_core::{CollectionRequest, ContentProvider, SentimentProvider, SourceStatus};
use subpulse_db::Store;

use crate::error::DeadlineElapsed;
use crate::fetcher::{Fetcher, INTERRUPTED_MESSAGE};
use crate::shutdown::ShutdownHandle;

/// Runs many sources concurrently with at most `pool_size` in flight.
///
/// Each source is an independent job: one source failing never affects the
/// others, and every requested source appears in the result map.
pub struct Orchestrator {
    fetcher: Fetcher,
    store: Arc<dyn Store>,
    shutdown: ShutdownHandle,
}

/// Per-source outcomes, updated as each run starts and finishes so they
/// survive the run future being dropped.
#[derive(Debug, Default)]
struct Progress {
    collected: HashMap<String, usize>,
    running: HashSet<String>,
}

fn lock(progress: &Mutex<Progress>) -> MutexGuard<'_, Progress> {
    progress.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        sentiment: Arc<dyn SentimentProvider>,
        store: Arc<dyn Store>,
    ) -> Self {
        let shutdown = ShutdownHandle::new();
        let fetcher = Fetcher::new(provider, sentiment, Arc::clone(&store))
            .with_shutdown(shutdown.signal());
        Self {
            fetcher,
            store,
            shutdown,
        }
    }

    /// Handle for requesting shutdown from outside (e.g. a Ctrl-C listener).
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Collect every source and return posts persisted per source.
    ///
    /// `pool_size` below 1 is treated as 1. Duplicate source names are
    /// collapsed to their first request. Sources not yet started when
    /// shutdown is requested are skipped and report 0.
    pub async fn collect(
        &self,
        requests: &[CollectionRequest],
        pool_size: usize,
    ) -> HashMap<String, usize> {
        let progress = Mutex::new(Progress::default());
        self.run_all(requests, pool_size, &progress).await;
        progress
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .collected
    }

    /// Like [`collect`](Self::collect), but stops early when `signal`
    /// resolves.
    ///
    /// After `signal` fires no new sources start, and running sources get up
    /// to `deadline` to finish their current item.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlineElapsed`] if running sources are still busy when the
    /// deadline passes. Those runs are abandoned and their status rows are set
    /// to `error:interrupted by shutdown`; the error carries the counts of
    /// every source, with 0 for the abandoned ones.
    pub async fn collect_until<S>(
        &self,
        requests: &[CollectionRequest],
        pool_size: usize,
        signal: S,
        deadline: Duration,
    ) -> Result<HashMap<String, usize>, DeadlineElapsed>
    where
        S: Future<Output = ()>,
    {
        let progress = Mutex::new(Progress::default());
        let mut run = Box::pin(self.run_all(requests, pool_size, &progress));
        tokio::pin!(signal);

        tokio::select! {
            () = &mut run => return Ok(lock(&progress).collected.clone()),
            () = &mut signal => {
                tracing::warn!(deadline_secs = deadline.as_secs(), "shutdown requested, waiting for running sources");
                self.shutdown.request_shutdown();
            }
        }

        if tokio::time::timeout(deadline, &mut run).await.is_ok() {
            return Ok(lock(&progress).collected.clone());
        }
        drop(run);

        let (collected, abandoned) = {
            let state = lock(&progress);
            let mut abandoned: Vec<String> = state.running.iter().cloned().collect();
            abandoned.sort();
            (state.collected.clone(), abandoned)
        };

        let status = SourceStatus::Error(INTERRUPTED_MESSAGE.to_string());
        let now = chrono::Utc::now().timestamp();
        for source in &abandoned {
            tracing::warn!(source = %source, "source still running at shutdown deadline, abandoning");
            if let Err(e) = self.store.set_source_status(source, &status, now).await {
                tracing::error!(source = %source, error = %e, "failed to record source status");
            }
        }

        Err(DeadlineElapsed {
            deadline,
            collected,
        })
    }

    /// Drive every run, recording each source's outcome in `progress` as it
    /// finishes.
    async fn run_all(
        &self,
        requests: &[CollectionRequest],
        pool_size: usize,
        progress: &Mutex<Progress>,
    ) {
        let pool_size = pool_size.max(1);
        let requests = dedup_requests(requests);
        lock(progress).collected = requests.iter().map(|r| (r.source.clone(), 0)).collect();

        tracing::info!(sources = requests.len(), pool_size, "starting collection");

        let skipped = stream::iter(requests)
            .map(|request| {
                let fetcher = &self.fetcher;
                let shutdown = &self.shutdown;
                async move {
                    if shutdown.is_requested() {
                        tracing::info!(source = %request.source, "shutdown requested, not starting source");
                        return false;
                    }
                    lock(progress).running.insert(request.source.clone());
                    let collected = fetcher.run(&request).await;
                    let mut state = lock(progress);
                    state.running.remove(&request.source);
                    state.collected.insert(request.source, collected);
                    true
                }
            })
            .buffer_unordered(pool_size)
            .filter(|started| future::ready(!*started))
            .count()
            .await;

        let state = lock(progress);
        let total: usize = state.collected.values().sum();
        tracing::info!(
            sources = state.collected.len(),
            skipped,
            posts = total,
            "collection finished"
        );
    }
}

/// Keep the first request for each source name, preserving order.
fn dedup_requests(requests: &[CollectionRequest]) -> Vec<CollectionRequest> {
    let mut seen = HashSet::new();
    requests
        .iter()
        .filter(|r| {
            let first = seen.insert(r.source.as_str());
            if !first {
                tracing::warn!(source = %r.source, "duplicate source in request batch, ignoring");
            }
            first
        })
        .cloned()
        .collect()
}

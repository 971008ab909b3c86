//! One source's collection pass: enumerate, score, upsert, record status.

use std::sync::Arc;

use futures::StreamExt;
use subpulse_core::{
    CollectionRequest, ContentProvider, RawItem, SentimentProvider, SortMethod, SourceStatus,
    TimeFilter,
};
use subpulse_db::Store;

use crate::shutdown::{ShutdownHandle, ShutdownSignal};
use crate::validate::{build_comment, build_post, post_text};

/// Status message recorded when a run stops early for shutdown.
pub const INTERRUPTED_MESSAGE: &str = "interrupted by shutdown";

/// Runs collection for a single source.
///
/// Holds its collaborators behind trait objects so tests can substitute any
/// of them.
#[derive(Clone)]
pub struct Fetcher {
    provider: Arc<dyn ContentProvider>,
    sentiment: Arc<dyn SentimentProvider>,
    store: Arc<dyn Store>,
    shutdown: ShutdownSignal,
}

impl Fetcher {
    #[must_use]
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        sentiment: Arc<dyn SentimentProvider>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            provider,
            sentiment,
            store,
            shutdown: ShutdownHandle::new().signal(),
        }
    }

    /// Observe `signal` between items.
    #[must_use]
    pub fn with_shutdown(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown = signal;
        self
    }

    /// Collect one source and return the number of posts persisted.
    ///
    /// Never fails. Item-level problems are logged and skipped; an
    /// enumeration failure ends the run early. Either way the outcome is
    /// written to the source's status row.
    pub async fn run(&self, request: &CollectionRequest) -> usize {
        let source = request.source.as_str();
        let sort = SortMethod::parse_or_hot(&request.sort_method);
        let time_filter = TimeFilter::parse_or_all(&request.time_filter);

        tracing::info!(
            source,
            sort = %sort,
            time_filter = %time_filter,
            limit = request.limit,
            fetch_comments = request.fetch_comments,
            "collecting source"
        );

        let (collected, status) = self.collect_items(request, sort, time_filter).await;

        match &status {
            SourceStatus::Completed => {
                tracing::info!(source, collected, "source collection completed");
            }
            SourceStatus::Error(message) => {
                tracing::warn!(source, collected, error = %message, "source collection failed");
            }
        }

        if let Err(e) = self
            .store
            .set_source_status(source, &status, now_epoch())
            .await
        {
            tracing::error!(source, error = %e, "failed to record source status");
        }

        collected
    }

    async fn collect_items(
        &self,
        request: &CollectionRequest,
        sort: SortMethod,
        time_filter: TimeFilter,
    ) -> (usize, SourceStatus) {
        let source = request.source.as_str();
        let mut shutdown = self.shutdown.clone();
        let mut items = self
            .provider
            .list_items(source, sort, time_filter, request.limit)
            .take(request.limit);
        let mut collected = 0usize;

        loop {
            // Biased so an already-requested shutdown wins over a ready item.
            let next = tokio::select! {
                biased;
                () = shutdown.requested() => {
                    return (collected, SourceStatus::Error(INTERRUPTED_MESSAGE.to_string()));
                }
                next = items.next() => next,
            };

            match next {
                None => return (collected, SourceStatus::Completed),
                Some(Err(e)) => return (collected, SourceStatus::Error(e.message)),
                Some(Ok(raw)) => {
                    if self.process_item(request, raw).await {
                        collected += 1;
                    }
                }
            }
        }
    }

    /// Validate, score, and persist one item, then its comments if requested.
    ///
    /// Returns `true` if the post was persisted.
    async fn process_item(&self, request: &CollectionRequest, raw: RawItem) -> bool {
        let source = request.source.as_str();
        let scores = self.sentiment.score(&post_text(&raw));

        let post = match build_post(raw, source, scores, now_epoch()) {
            Ok(post) => post,
            Err(e) => {
                tracing::warn!(source, error = %e, "skipping malformed item");
                return false;
            }
        };

        if let Err(e) = self.store.upsert_post(&post).await {
            tracing::warn!(source, post_id = %post.id, error = %e, "failed to persist post, skipping");
            return false;
        }

        if request.fetch_comments && post.num_comments > 0 {
            self.collect_comments(source, &post.id, request.max_comments)
                .await;
        }

        true
    }

    async fn collect_comments(&self, source: &str, post_id: &str, max: usize) {
        let comments = match self.provider.list_top_level_comments(post_id, max).await {
            Ok(comments) => comments,
            Err(e) => {
                tracing::warn!(source, post_id, error = %e, "failed to list comments, skipping");
                return;
            }
        };

        let mut stored = 0usize;
        for raw in comments.into_iter().take(max) {
            let scores = self
                .sentiment
                .score(raw.body.as_deref().unwrap_or_default());
            let comment = match build_comment(raw, post_id, scores, now_epoch()) {
                Ok(comment) => comment,
                Err(e) => {
                    tracing::warn!(source, post_id, error = %e, "skipping malformed comment");
                    continue;
                }
            };
            match self.store.upsert_comment(&comment).await {
                Ok(()) => stored += 1,
                Err(e) => {
                    tracing::warn!(
                        source,
                        post_id,
                        comment_id = %comment.id,
                        error = %e,
                        "failed to persist comment, skipping"
                    );
                }
            }
        }

        tracing::debug!(source, post_id, stored, "stored comments");
    }
}

fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

//! Test doubles and fixtures shared by the pipeline integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use subpulse_core::{
    Comment, ContentProvider, Post, ProviderError, RawComment, RawItem, SortMethod,
    SourceJobStatus, SourceStatus, TimeFilter,
};
use subpulse_db::{open_store, DbError, PoolConfig, SqliteStore, Store};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Store fixtures
// ---------------------------------------------------------------------------

pub async fn temp_store() -> (TempDir, Arc<SqliteStore>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("pipeline.db").display());
    let store = open_store(&url, PoolConfig::default())
        .await
        .expect("store should open and migrate");
    (dir, Arc::new(store))
}

/// Store that rejects writes for chosen ids and delegates everything else.
pub struct FailingStore {
    inner: Arc<SqliteStore>,
    fail_posts: HashSet<String>,
    fail_comments: HashSet<String>,
}

impl FailingStore {
    pub fn new(inner: Arc<SqliteStore>) -> Self {
        Self {
            inner,
            fail_posts: HashSet::new(),
            fail_comments: HashSet::new(),
        }
    }

    pub fn failing_post(mut self, id: &str) -> Self {
        self.fail_posts.insert(id.to_string());
        self
    }

    pub fn failing_comment(mut self, id: &str) -> Self {
        self.fail_comments.insert(id.to_string());
        self
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn upsert_post(&self, post: &Post) -> Result<(), DbError> {
        if self.fail_posts.contains(&post.id) {
            return Err(DbError::NotFound);
        }
        self.inner.upsert_post(post).await
    }

    async fn upsert_comment(&self, comment: &Comment) -> Result<(), DbError> {
        if self.fail_comments.contains(&comment.id) {
            return Err(DbError::NotFound);
        }
        self.inner.upsert_comment(comment).await
    }

    async fn set_source_status(
        &self,
        source: &str,
        status: &SourceStatus,
        last_collected: i64,
    ) -> Result<(), DbError> {
        self.inner
            .set_source_status(source, status, last_collected)
            .await
    }

    async fn get_source_status(&self, source: &str) -> Result<Option<SourceJobStatus>, DbError> {
        self.inner.get_source_status(source).await
    }

    async fn list_source_statuses(&self) -> Result<Vec<SourceJobStatus>, DbError> {
        self.inner.list_source_statuses().await
    }

    async fn query_recent_posts(&self, since_epoch: i64) -> Result<Vec<Post>, DbError> {
        self.inner.query_recent_posts(since_epoch).await
    }

    async fn query_comments_for_posts(
        &self,
        post_ids: &HashSet<String>,
    ) -> Result<HashMap<String, Vec<Comment>>, DbError> {
        self.inner.query_comments_for_posts(post_ids).await
    }
}

/// Store that returns recent posts oldest first, which the `Store` contract
/// permits.
pub struct OldestFirstStore {
    inner: Arc<SqliteStore>,
}

impl OldestFirstStore {
    pub fn new(inner: Arc<SqliteStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Store for OldestFirstStore {
    async fn upsert_post(&self, post: &Post) -> Result<(), DbError> {
        self.inner.upsert_post(post).await
    }

    async fn upsert_comment(&self, comment: &Comment) -> Result<(), DbError> {
        self.inner.upsert_comment(comment).await
    }

    async fn set_source_status(
        &self,
        source: &str,
        status: &SourceStatus,
        last_collected: i64,
    ) -> Result<(), DbError> {
        self.inner
            .set_source_status(source, status, last_collected)
            .await
    }

    async fn get_source_status(&self, source: &str) -> Result<Option<SourceJobStatus>, DbError> {
        self.inner.get_source_status(source).await
    }

    async fn list_source_statuses(&self) -> Result<Vec<SourceJobStatus>, DbError> {
        self.inner.list_source_statuses().await
    }

    async fn query_recent_posts(&self, since_epoch: i64) -> Result<Vec<Post>, DbError> {
        let mut posts = self.inner.query_recent_posts(since_epoch).await?;
        posts.sort_by(|a, b| a.created_utc.cmp(&b.created_utc).then_with(|| b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn query_comments_for_posts(
        &self,
        post_ids: &HashSet<String>,
    ) -> Result<HashMap<String, Vec<Comment>>, DbError> {
        self.inner.query_comments_for_posts(post_ids).await
    }
}

// ---------------------------------------------------------------------------
// Provider double
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ListCall {
    pub source: String,
    pub sort: SortMethod,
    pub time_filter: TimeFilter,
    pub limit: usize,
}

/// Provider that replays scripted listings and comment responses.
///
/// A source with no script yields a single "unknown source" error.
#[derive(Default)]
pub struct ScriptedProvider {
    listings: HashMap<String, Vec<Result<RawItem, ProviderError>>>,
    comments: HashMap<String, Result<Vec<RawComment>, ProviderError>>,
    item_delay: Option<Duration>,
    comment_delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    list_calls: Mutex<Vec<ListCall>>,
    comment_calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, source: &str, items: Vec<RawItem>) -> Self {
        self.listings
            .insert(source.to_string(), items.into_iter().map(Ok).collect());
        self
    }

    pub fn with_listing(
        mut self,
        source: &str,
        listing: Vec<Result<RawItem, ProviderError>>,
    ) -> Self {
        self.listings.insert(source.to_string(), listing);
        self
    }

    pub fn with_comments(mut self, post_id: &str, comments: Vec<RawComment>) -> Self {
        self.comments.insert(post_id.to_string(), Ok(comments));
        self
    }

    pub fn with_comment_error(mut self, post_id: &str, message: &str) -> Self {
        self.comments
            .insert(post_id.to_string(), Err(ProviderError::new(message)));
        self
    }

    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = Some(delay);
        self
    }

    pub fn with_comment_delay(mut self, delay: Duration) -> Self {
        self.comment_delay = Some(delay);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> Vec<ListCall> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn comment_calls(&self) -> Vec<String> {
        self.comment_calls.lock().unwrap().clone()
    }
}

/// Counts a listing as in flight from creation until the stream is dropped.
struct InFlight<'a> {
    current: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(current: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentProvider for ScriptedProvider {
    fn list_items<'a>(
        &'a self,
        source: &'a str,
        sort: SortMethod,
        time_filter: TimeFilter,
        limit: usize,
    ) -> BoxStream<'a, Result<RawItem, ProviderError>> {
        self.list_calls.lock().unwrap().push(ListCall {
            source: source.to_string(),
            sort,
            time_filter,
            limit,
        });

        let items = self.listings.get(source).cloned().unwrap_or_else(|| {
            vec![Err(ProviderError::new(format!("unknown source {source}")))]
        });
        let guard = InFlight::enter(&self.in_flight, &self.max_in_flight);
        let delay = self.item_delay;

        stream::unfold((items.into_iter(), guard), move |(mut iter, guard)| async move {
            let item = iter.next()?;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Some((item, (iter, guard)))
        })
        .boxed()
    }

    async fn list_top_level_comments(
        &self,
        item_id: &str,
        max: usize,
    ) -> Result<Vec<RawComment>, ProviderError> {
        self.comment_calls.lock().unwrap().push(item_id.to_string());
        if let Some(delay) = self.comment_delay {
            tokio::time::sleep(delay).await;
        }
        match self.comments.get(item_id) {
            Some(Ok(comments)) => Ok(comments.iter().take(max).cloned().collect()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw record builders
// ---------------------------------------------------------------------------

pub fn raw_item(id: &str) -> RawItem {
    RawItem {
        id: id.to_string(),
        title: Some(format!("A great post {id}")),
        score: 10,
        num_comments: 0,
        upvote_ratio: Some(0.9),
        url: format!("https://example.com/{id}"),
        author: Some("alice".to_string()),
        created_utc: Some(1_700_000_000.0),
        selftext: Some("I love this".to_string()),
    }
}

pub fn raw_items(prefix: &str, n: usize) -> Vec<RawItem> {
    (1..=n).map(|i| raw_item(&format!("{prefix}{i}"))).collect()
}

pub fn raw_comment(id: &str) -> RawComment {
    RawComment {
        id: id.to_string(),
        author: Some("bob".to_string()),
        body: Some("terrible take".to_string()),
        score: 1,
        created_utc: Some(1_700_000_100.0),
    }
}

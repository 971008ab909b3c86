//! The store contract used by the ingest pipeline, and its SQLite implementation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::SqlitePool;
use subpulse_core::{Comment, Post, SourceJobStatus, SourceStatus};

use crate::DbError;

/// Persistence contract for collected posts, comments, and per-source status.
///
/// Every write touches exactly one row and is atomic on its own. Nothing
/// above this trait sees the underlying tables.
#[async_trait]
pub trait Store: Send + Sync {
    async fn upsert_post(&self, post: &Post) -> Result<(), DbError>;

    async fn upsert_comment(&self, comment: &Comment) -> Result<(), DbError>;

    async fn set_source_status(
        &self,
        source: &str,
        status: &SourceStatus,
        last_collected: i64,
    ) -> Result<(), DbError>;

    async fn get_source_status(&self, source: &str) -> Result<Option<SourceJobStatus>, DbError>;

    async fn list_source_statuses(&self) -> Result<Vec<SourceJobStatus>, DbError>;

    async fn query_recent_posts(&self, since_epoch: i64) -> Result<Vec<Post>, DbError>;

    async fn query_comments_for_posts(
        &self,
        post_ids: &HashSet<String>,
    ) -> Result<HashMap<String, Vec<Comment>>, DbError>;
}

/// [`Store`] backed by a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert_post(&self, post: &Post) -> Result<(), DbError> {
        crate::posts::upsert_post(&self.pool, post).await
    }

    async fn upsert_comment(&self, comment: &Comment) -> Result<(), DbError> {
        crate::comments::upsert_comment(&self.pool, comment).await
    }

    async fn set_source_status(
        &self,
        source: &str,
        status: &SourceStatus,
        last_collected: i64,
    ) -> Result<(), DbError> {
        crate::source_status::set_source_status(&self.pool, source, status, last_collected).await
    }

    async fn get_source_status(&self, source: &str) -> Result<Option<SourceJobStatus>, DbError> {
        crate::source_status::get_source_status(&self.pool, source).await
    }

    async fn list_source_statuses(&self) -> Result<Vec<SourceJobStatus>, DbError> {
        crate::source_status::list_source_statuses(&self.pool).await
    }

    async fn query_recent_posts(&self, since_epoch: i64) -> Result<Vec<Post>, DbError> {
        crate::posts::query_recent_posts(&self.pool, since_epoch).await
    }

    async fn query_comments_for_posts(
        &self,
        post_ids: &HashSet<String>,
    ) -> Result<HashMap<String, Vec<Comment>>, DbError> {
        crate::comments::query_comments_for_posts(&self.pool, post_ids).await
    }
}

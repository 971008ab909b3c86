//! Windowed export of recent posts with their comments embedded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use subpulse_core::{Comment, Post};
use subpulse_db::Store;

use crate::error::ExportError;

const SECONDS_PER_DAY: i64 = 86_400;

/// A post with exactly the stored comments whose `post_id` matches it.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedPost {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_time: DateTime<Utc>,
    /// `YYYY-MM-DD` of `export_time`.
    pub export_date: String,
    pub days_included: u32,
    pub post_count: usize,
    pub comment_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSnapshot {
    pub posts: Vec<ExportedPost>,
    pub metadata: ExportMetadata,
}

/// Read-only view over the store that produces export snapshots.
pub struct Exporter {
    store: Arc<dyn Store>,
}

impl Exporter {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Snapshot of posts created in the last `days` days, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Store`] if either store query fails.
    pub async fn export_window(&self, days: u32) -> Result<ExportSnapshot, ExportError> {
        self.export_window_at(days, Utc::now()).await
    }

    /// [`export_window`](Self::export_window) with an explicit clock.
    ///
    /// Posts with `created_utc` exactly at `now - days` are excluded. Posts
    /// are ordered by `created_utc` descending, ties broken by id.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Store`] if either store query fails.
    pub async fn export_window_at(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<ExportSnapshot, ExportError> {
        let since = now.timestamp() - i64::from(days) * SECONDS_PER_DAY;

        // Posts and comments are read separately; a comment written between
        // the two queries may or may not appear.
        let mut posts = self.store.query_recent_posts(since).await?;
        posts.sort_by(|a, b| {
            b.created_utc
                .cmp(&a.created_utc)
                .then_with(|| a.id.cmp(&b.id))
        });
        let post_ids: HashSet<String> = posts.iter().map(|p| p.id.clone()).collect();
        let mut comments_by_post = self.store.query_comments_for_posts(&post_ids).await?;

        let exported: Vec<ExportedPost> = posts
            .into_iter()
            .map(|post| {
                let comments = comments_by_post.remove(&post.id).unwrap_or_default();
                ExportedPost { post, comments }
            })
            .collect();

        let comment_count = exported.iter().map(|p| p.comments.len()).sum();
        let metadata = ExportMetadata {
            export_time: now,
            export_date: now.format("%Y-%m-%d").to_string(),
            days_included: days,
            post_count: exported.len(),
            comment_count,
        };

        tracing::info!(
            days,
            since,
            posts = metadata.post_count,
            comments = metadata.comment_count,
            "built export snapshot"
        );

        Ok(ExportSnapshot {
            posts: exported,
            metadata,
        })
    }
}

/// Write `snapshot` as pretty JSON to `dir/export_<YYYYmmdd_HHMMSS>.json`.
///
/// Creates `dir` if needed and returns the written path.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the directory or file cannot be written, or
/// [`ExportError::Serialize`] if serialization fails.
pub async fn write_snapshot(snapshot: &ExportSnapshot, dir: &Path) -> Result<PathBuf, ExportError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let file_name = format!(
        "export_{}.json",
        snapshot.metadata.export_time.format("%Y%m%d_%H%M%S")
    );
    let path = dir.join(file_name);
    let body = serde_json::to_vec_pretty(snapshot)?;

    tokio::fs::write(&path, body)
        .await
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), "wrote export snapshot");
    Ok(path)
}

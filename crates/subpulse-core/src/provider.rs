//! Capability interfaces consumed by the ingest pipeline.
//!
//! The pipeline never talks to a network SDK or a scoring model directly; it
//! receives implementations of these traits, which keeps collection logic
//! deterministic under test doubles.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::types::{SentimentScores, SortMethod, TimeFilter};

/// Enumeration-level failure from a content provider (auth, network, rate limit).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An item as yielded by the provider, before validation.
///
/// Optional fields are `None` when the provider omitted them; the pipeline
/// decides which omissions make the item unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub id: String,
    pub title: Option<String>,
    pub score: i64,
    pub num_comments: i64,
    pub upvote_ratio: Option<f64>,
    pub url: String,
    pub author: Option<String>,
    pub created_utc: Option<f64>,
    pub selftext: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawComment {
    pub id: String,
    pub author: Option<String>,
    pub body: Option<String>,
    pub score: i64,
    pub created_utc: Option<f64>,
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Lazily enumerate up to `limit` items for `source`.
    ///
    /// The stream is finite and cannot be restarted. An `Err` element means
    /// enumeration itself failed; no further items follow it.
    fn list_items<'a>(
        &'a self,
        source: &'a str,
        sort: SortMethod,
        time_filter: TimeFilter,
        limit: usize,
    ) -> BoxStream<'a, Result<RawItem, ProviderError>>;

    /// Fetch up to `max` directly visible top-level comments for an item.
    async fn list_top_level_comments(
        &self,
        item_id: &str,
        max: usize,
    ) -> Result<Vec<RawComment>, ProviderError>;
}

pub trait SentimentProvider: Send + Sync {
    /// Score arbitrary text. Never fails; blank input yields
    /// [`SentimentScores::NEUTRAL`].
    fn score(&self, text: &str) -> SentimentScores;
}

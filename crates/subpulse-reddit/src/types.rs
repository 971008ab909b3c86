//! Wire types for the subset of the Reddit API we consume.
//!
//! Every data field is optional; Reddit omits or nulls fields for removed and
//! deleted content, and validation happens downstream.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: Option<String>,
    pub(crate) error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Listing<T> {
    pub(crate) data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct ListingData<T> {
    #[serde(default)]
    pub(crate) children: Vec<Thing<T>>,
    pub(crate) after: Option<String>,
}

/// A `{kind, data}` envelope. `kind` is `t3` for posts, `t1` for comments,
/// and `more` for collapsed-reply stubs.
#[derive(Debug, Deserialize)]
pub(crate) struct Thing<T> {
    pub(crate) kind: String,
    pub(crate) data: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PostData {
    pub(crate) id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) score: Option<i64>,
    pub(crate) num_comments: Option<i64>,
    pub(crate) upvote_ratio: Option<f64>,
    pub(crate) url: Option<String>,
    pub(crate) permalink: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) created_utc: Option<f64>,
    pub(crate) selftext: Option<String>,
}

/// Comment fields. `more` stubs deserialize into this shape too, with most
/// fields absent; they are filtered by `kind` before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CommentData {
    pub(crate) id: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) score: Option<i64>,
    pub(crate) created_utc: Option<f64>,
}

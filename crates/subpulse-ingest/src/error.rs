use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A provider item or comment that cannot be turned into a stored record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing id")]
    MissingId,

    #[error("missing title")]
    MissingTitle,

    #[error("invalid created_utc: {0:?}")]
    InvalidCreatedUtc(Option<f64>),

    #[error("upvote_ratio out of range: {0:?}")]
    InvalidUpvoteRatio(Option<f64>),

    #[error("negative num_comments: {0}")]
    NegativeCommentCount(i64),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("store query failed: {0}")]
    Store(#[from] subpulse_db::DbError),

    #[error("failed to serialize export snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write export to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Running sources did not stop within the shutdown deadline.
///
/// `collected` still holds an entry for every requested source. Sources that
/// were running when the deadline passed report 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("running sources did not finish within {deadline:?} of shutdown")]
pub struct DeadlineElapsed {
    pub deadline: Duration,
    pub collected: HashMap<String, usize>,
}

//! Domain records shared by the store, the providers, and the ingest pipeline.

use serde::{Deserialize, Serialize};

/// Listing order requested from the content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMethod {
    Hot,
    New,
    Top,
    Rising,
    Controversial,
}

impl SortMethod {
    /// Parse a sort name, degrading unknown values to [`SortMethod::Hot`].
    ///
    /// An unrecognized value is not an error; it is logged and collection
    /// proceeds with the default ordering.
    #[must_use]
    pub fn parse_or_hot(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hot" => Self::Hot,
            "new" => Self::New,
            "top" => Self::Top,
            "rising" => Self::Rising,
            "controversial" => Self::Controversial,
            other => {
                tracing::warn!(sort_method = other, "unrecognized sort method, using hot");
                Self::Hot
            }
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::New => "new",
            Self::Top => "top",
            Self::Rising => "rising",
            Self::Controversial => "controversial",
        }
    }

    /// Whether the provider honours a time filter for this ordering.
    #[must_use]
    pub fn uses_time_filter(self) -> bool {
        matches!(self, Self::Top | Self::Controversial)
    }
}

impl std::fmt::Display for SortMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time window applied to `top` and `controversial` listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeFilter {
    /// Parse a time filter name, degrading unknown values to [`TimeFilter::All`].
    #[must_use]
    pub fn parse_or_all(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hour" => Self::Hour,
            "day" => Self::Day,
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            "all" => Self::All,
            other => {
                tracing::warn!(time_filter = other, "unrecognized time filter, using all");
                Self::All
            }
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment breakdown for one piece of text.
///
/// `neg`, `neu`, and `pos` are proportions in `[0.0, 1.0]` summing to ~1.0.
/// `compound` is the normalized overall polarity in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

impl SentimentScores {
    /// Score assigned to empty or unscorable text.
    pub const NEUTRAL: Self = Self {
        neg: 0.0,
        neu: 1.0,
        pos: 0.0,
        compound: 0.0,
    };
}

impl Default for SentimentScores {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// A collected post with its sentiment enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub score: i64,
    pub num_comments: i64,
    pub upvote_ratio: f64,
    pub url: String,
    pub author: String,
    /// Provider creation time, epoch seconds.
    pub created_utc: i64,
    pub selftext: String,
    pub sentiment_neg: f64,
    pub sentiment_neu: f64,
    pub sentiment_pos: f64,
    pub sentiment_compound: f64,
    pub source: String,
    /// Pipeline time of the last write, epoch seconds.
    pub collected_at: i64,
}

/// A top-level comment on a collected post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: i64,
    pub sentiment_neg: f64,
    pub sentiment_neu: f64,
    pub sentiment_pos: f64,
    pub sentiment_compound: f64,
    pub collected_at: i64,
}

/// Terminal outcome of the most recent collection run for a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Completed,
    Error(String),
}

impl SourceStatus {
    /// Parse the persisted form (`completed` or `error:<message>`).
    ///
    /// Anything else is treated as an error status carrying the raw text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == "completed" {
            Self::Completed
        } else if let Some(message) = raw.strip_prefix("error:") {
            Self::Error(message.to_string())
        } else {
            Self::Error(raw.to_string())
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Error(message) => write!(f, "error:{message}"),
        }
    }
}

/// Row in the per-source job status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceJobStatus {
    pub source: String,
    pub last_collected: i64,
    pub status: SourceStatus,
}

fn default_sort_method() -> String {
    "hot".to_string()
}

fn default_time_filter() -> String {
    "all".to_string()
}

fn default_limit() -> usize {
    100
}

fn default_max_comments() -> usize {
    20
}

/// Collection parameters for one source.
///
/// `sort_method` and `time_filter` are kept as raw strings so that an
/// unrecognized value degrades at run time instead of rejecting the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRequest {
    pub source: String,
    #[serde(default = "default_sort_method")]
    pub sort_method: String,
    #[serde(default = "default_time_filter")]
    pub time_filter: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub fetch_comments: bool,
    #[serde(default = "default_max_comments")]
    pub max_comments: usize,
}

impl CollectionRequest {
    /// Request for `source` with all other fields at their defaults.
    #[must_use]
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            sort_method: default_sort_method(),
            time_filter: default_time_filter(),
            limit: default_limit(),
            fetch_comments: false,
            max_comments: default_max_comments(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub days: u32,
}

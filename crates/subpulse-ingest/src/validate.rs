//! Turning raw provider records into storable posts and comments.

use subpulse_core::{Comment, Post, RawComment, RawItem, SentimentScores};

use crate::error::ValidationError;

/// Author placeholder for deleted or suspended accounts.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// Text fed to the sentiment scorer for a post.
#[must_use]
pub fn post_text(item: &RawItem) -> String {
    format!(
        "{} {}",
        item.title.as_deref().unwrap_or_default(),
        item.selftext.as_deref().unwrap_or_default()
    )
}

/// Build a [`Post`] from a raw item.
///
/// # Errors
///
/// Returns [`ValidationError`] for an empty id, a missing title, a missing or
/// negative timestamp, an `upvote_ratio` outside `[0, 1]`, or a negative
/// comment count.
pub fn build_post(
    item: RawItem,
    source: &str,
    scores: SentimentScores,
    collected_at: i64,
) -> Result<Post, ValidationError> {
    if item.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    let title = match item.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => return Err(ValidationError::MissingTitle),
    };
    let created_utc = epoch_seconds(item.created_utc)?;
    let upvote_ratio = match item.upvote_ratio {
        Some(r) if (0.0..=1.0).contains(&r) => r,
        other => return Err(ValidationError::InvalidUpvoteRatio(other)),
    };
    if item.num_comments < 0 {
        return Err(ValidationError::NegativeCommentCount(item.num_comments));
    }

    Ok(Post {
        id: item.id,
        title,
        score: item.score,
        num_comments: item.num_comments,
        upvote_ratio,
        url: item.url,
        author: author_or_deleted(item.author),
        created_utc,
        selftext: item.selftext.unwrap_or_default(),
        sentiment_neg: scores.neg,
        sentiment_neu: scores.neu,
        sentiment_pos: scores.pos,
        sentiment_compound: scores.compound,
        source: source.to_string(),
        collected_at,
    })
}

/// Build a [`Comment`] from a raw comment. A missing body is stored empty.
///
/// # Errors
///
/// Returns [`ValidationError`] for an empty id or a missing or negative
/// timestamp.
pub fn build_comment(
    raw: RawComment,
    post_id: &str,
    scores: SentimentScores,
    collected_at: i64,
) -> Result<Comment, ValidationError> {
    if raw.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    let created_utc = epoch_seconds(raw.created_utc)?;

    Ok(Comment {
        id: raw.id,
        post_id: post_id.to_string(),
        author: author_or_deleted(raw.author),
        body: raw.body.unwrap_or_default(),
        score: raw.score,
        created_utc,
        sentiment_neg: scores.neg,
        sentiment_neu: scores.neu,
        sentiment_pos: scores.pos,
        sentiment_compound: scores.compound,
        collected_at,
    })
}

fn author_or_deleted(author: Option<String>) -> String {
    match author {
        Some(a) if !a.trim().is_empty() => a,
        _ => DELETED_AUTHOR.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_seconds(raw: Option<f64>) -> Result<i64, ValidationError> {
    match raw {
        // Upper bound keeps the cast in range.
        Some(t) if t.is_finite() && t >= 0.0 && t < 1e15 => Ok(t.trunc() as i64),
        other => Err(ValidationError::InvalidCreatedUtc(other)),
    }
}

//! Database operations for the `comments` table.

use std::collections::{HashMap, HashSet};

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use subpulse_core::Comment;

use crate::DbError;

/// Keeps each `IN (...)` list well under SQLite's bound-parameter limit.
const POST_ID_CHUNK: usize = 500;

/// A row from the `comments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
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

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author: row.author,
            body: row.body,
            score: row.score,
            created_utc: row.created_utc,
            sentiment_neg: row.sentiment_neg,
            sentiment_neu: row.sentiment_neu,
            sentiment_pos: row.sentiment_pos,
            sentiment_compound: row.sentiment_compound,
            collected_at: row.collected_at,
        }
    }
}

/// Insert or replace a comment keyed on `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_comment(pool: &SqlitePool, comment: &Comment) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO comments \
             (id, post_id, author, body, score, created_utc, sentiment_neg, sentiment_neu, \
              sentiment_pos, sentiment_compound, collected_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (id) DO UPDATE SET \
             post_id            = excluded.post_id, \
             author             = excluded.author, \
             body               = excluded.body, \
             score              = excluded.score, \
             created_utc        = excluded.created_utc, \
             sentiment_neg      = excluded.sentiment_neg, \
             sentiment_neu      = excluded.sentiment_neu, \
             sentiment_pos      = excluded.sentiment_pos, \
             sentiment_compound = excluded.sentiment_compound, \
             collected_at       = MAX(comments.collected_at, excluded.collected_at)",
    )
    .bind(&comment.id)
    .bind(&comment.post_id)
    .bind(&comment.author)
    .bind(&comment.body)
    .bind(comment.score)
    .bind(comment.created_utc)
    .bind(comment.sentiment_neg)
    .bind(comment.sentiment_neu)
    .bind(comment.sentiment_pos)
    .bind(comment.sentiment_compound)
    .bind(comment.collected_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all comments belonging to the given posts, grouped by `post_id`.
///
/// Posts without comments are absent from the returned map. Within a post,
/// comments are ordered by `created_utc` then `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any chunked query fails.
pub async fn query_comments_for_posts(
    pool: &SqlitePool,
    post_ids: &HashSet<String>,
) -> Result<HashMap<String, Vec<Comment>>, DbError> {
    let mut grouped: HashMap<String, Vec<Comment>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(grouped);
    }

    let ids: Vec<&String> = post_ids.iter().collect();
    for chunk in ids.chunks(POST_ID_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, post_id, author, body, score, created_utc, sentiment_neg, \
                    sentiment_neu, sentiment_pos, sentiment_compound, collected_at \
             FROM comments WHERE post_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(") ORDER BY created_utc, id");

        let rows = builder
            .build_query_as::<CommentRow>()
            .fetch_all(pool)
            .await?;

        for row in rows {
            grouped
                .entry(row.post_id.clone())
                .or_default()
                .push(row.into());
        }
    }

    Ok(grouped)
}

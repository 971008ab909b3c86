//! Database operations for the `posts` table.

use sqlx::SqlitePool;
use subpulse_core::Post;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: String,
    pub title: String,
    pub score: i64,
    pub num_comments: i64,
    pub upvote_ratio: f64,
    pub url: String,
    pub author: String,
    pub created_utc: i64,
    pub selftext: String,
    pub sentiment_neg: f64,
    pub sentiment_neu: f64,
    pub sentiment_pos: f64,
    pub sentiment_compound: f64,
    pub source: String,
    pub collected_at: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            score: row.score,
            num_comments: row.num_comments,
            upvote_ratio: row.upvote_ratio,
            url: row.url,
            author: row.author,
            created_utc: row.created_utc,
            selftext: row.selftext,
            sentiment_neg: row.sentiment_neg,
            sentiment_neu: row.sentiment_neu,
            sentiment_pos: row.sentiment_pos,
            sentiment_compound: row.sentiment_compound,
            source: row.source,
            collected_at: row.collected_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert or replace a post keyed on `id`.
///
/// Every field is overwritten on conflict except `collected_at`, which only
/// ever moves forward.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails (including CHECK violations
/// for out-of-range ratios or sentiment values).
pub async fn upsert_post(pool: &SqlitePool, post: &Post) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO posts \
             (id, title, score, num_comments, upvote_ratio, url, author, created_utc, \
              selftext, sentiment_neg, sentiment_neu, sentiment_pos, sentiment_compound, \
              source, collected_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         ON CONFLICT (id) DO UPDATE SET \
             title              = excluded.title, \
             score              = excluded.score, \
             num_comments       = excluded.num_comments, \
             upvote_ratio       = excluded.upvote_ratio, \
             url                = excluded.url, \
             author             = excluded.author, \
             created_utc        = excluded.created_utc, \
             selftext           = excluded.selftext, \
             sentiment_neg      = excluded.sentiment_neg, \
             sentiment_neu      = excluded.sentiment_neu, \
             sentiment_pos      = excluded.sentiment_pos, \
             sentiment_compound = excluded.sentiment_compound, \
             source             = excluded.source, \
             collected_at       = MAX(posts.collected_at, excluded.collected_at)",
    )
    .bind(&post.id)
    .bind(&post.title)
    .bind(post.score)
    .bind(post.num_comments)
    .bind(post.upvote_ratio)
    .bind(&post.url)
    .bind(&post.author)
    .bind(post.created_utc)
    .bind(&post.selftext)
    .bind(post.sentiment_neg)
    .bind(post.sentiment_neu)
    .bind(post.sentiment_pos)
    .bind(post.sentiment_compound)
    .bind(&post.source)
    .bind(post.collected_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Return all posts created strictly after `since_epoch`.
///
/// Ordered by `created_utc DESC, id` so repeated queries return rows in the
/// same order. This is not part of the [`Store`](crate::Store) contract; the
/// exporter sorts its own output.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn query_recent_posts(pool: &SqlitePool, since_epoch: i64) -> Result<Vec<Post>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(
        "SELECT id, title, score, num_comments, upvote_ratio, url, author, created_utc, \
                selftext, sentiment_neg, sentiment_neu, sentiment_pos, sentiment_compound, \
                source, collected_at \
         FROM posts \
         WHERE created_utc > $1 \
         ORDER BY created_utc DESC, id",
    )
    .bind(since_epoch)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Post::from).collect())
}

/// Fetch a single post by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_post(pool: &SqlitePool, id: &str) -> Result<Post, DbError> {
    let row = sqlx::query_as::<_, PostRow>(
        "SELECT id, title, score, num_comments, upvote_ratio, url, author, created_utc, \
                selftext, sentiment_neg, sentiment_neu, sentiment_pos, sentiment_compound, \
                source, collected_at \
         FROM posts \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row.into())
}

/// Count rows for a post id. Only ever 0 or 1; used to verify dedup.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_posts_with_id(pool: &SqlitePool, id: &str) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

//! Database operations for the `source_status` table.

use sqlx::SqlitePool;
use subpulse_core::{SourceJobStatus, SourceStatus};

use crate::DbError;

/// A row from the `source_status` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SourceStatusRow {
    pub source: String,
    pub last_collected: i64,
    /// Persisted as `completed` or `error:<message>`.
    pub status: String,
}

impl From<SourceStatusRow> for SourceJobStatus {
    fn from(row: SourceStatusRow) -> Self {
        Self {
            status: SourceStatus::parse(&row.status),
            source: row.source,
            last_collected: row.last_collected,
        }
    }
}

/// Unconditionally overwrite the status row for `source`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn set_source_status(
    pool: &SqlitePool,
    source: &str,
    status: &SourceStatus,
    last_collected: i64,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO source_status (source, last_collected, status) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (source) DO UPDATE SET \
             last_collected = excluded.last_collected, \
             status         = excluded.status",
    )
    .bind(source)
    .bind(last_collected)
    .bind(status.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch the status row for one source, or `None` if it was never collected.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_source_status(
    pool: &SqlitePool,
    source: &str,
) -> Result<Option<SourceJobStatus>, DbError> {
    let row = sqlx::query_as::<_, SourceStatusRow>(
        "SELECT source, last_collected, status FROM source_status WHERE source = $1",
    )
    .bind(source)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(SourceJobStatus::from))
}

/// All status rows, most recently collected first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_source_statuses(pool: &SqlitePool) -> Result<Vec<SourceJobStatus>, DbError> {
    let rows = sqlx::query_as::<_, SourceStatusRow>(
        "SELECT source, last_collected, status FROM source_status \
         ORDER BY last_collected DESC, source",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SourceJobStatus::from).collect())
}

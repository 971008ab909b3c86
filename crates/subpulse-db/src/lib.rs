use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// Path relative to crates/subpulse-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// How long a writer waits on SQLite's database lock before failing.
    pub busy_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &subpulse_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections.max(1),
            acquire_timeout_secs: config.db_acquire_timeout_secs,
            busy_timeout_ms: config.db_busy_timeout_ms,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Open a SQLite pool in WAL mode, creating the database file if needed.
///
/// WAL lets export queries read while collectors write; the busy timeout
/// makes concurrent single-row upserts queue on the write lock instead of
/// failing immediately.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the URL is malformed or the database cannot be opened.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, sqlx::migrate::MigrateError> {
    // The _sqlx_migrations table does not exist on a fresh database; treat
    // absence as zero applied.
    let applied_before: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let applied_after: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

/// Open the pool and bring the schema up to date.
///
/// This is the one store failure that is fatal to a whole invocation.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or migrated.
pub async fn open_store(database_url: &str, config: PoolConfig) -> Result<SqliteStore, DbError> {
    let pool = connect_pool(database_url, config).await?;
    let applied = run_migrations(&pool).await?;
    tracing::debug!(applied, "database migrations applied");
    Ok(SqliteStore::new(pool))
}

pub mod comments;
pub mod posts;
pub mod source_status;
pub mod store;

pub use comments::{query_comments_for_posts, upsert_comment, CommentRow};
pub use posts::{count_posts_with_id, get_post, query_recent_posts, upsert_post, PostRow};
pub use source_status::{
    get_source_status, list_source_statuses, set_source_status, SourceStatusRow,
};
pub use store::{SqliteStore, Store};

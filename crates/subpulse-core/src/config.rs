use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "subpulse/0.1 (content-ingest)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration from an env-var lookup function.
///
/// Decoupled from the real process environment so tests can pass a plain map.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let non_empty = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let database_url = or_default("DATABASE_URL", "sqlite://subpulse.db");
    let env = parse_environment(&or_default("SUBPULSE_ENV", "development"));
    let log_level = or_default("SUBPULSE_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default("SUBPULSE_SOURCES_PATH", "./config/sources.yaml"));
    let export_dir = PathBuf::from(or_default("SUBPULSE_EXPORT_DIR", "./exports"));

    let pool_size = parse_usize("SUBPULSE_POOL_SIZE", "5")?;
    if pool_size == 0 {
        return Err(invalid("SUBPULSE_POOL_SIZE", "must be at least 1".to_string()));
    }

    let db_max_connections = parse_u32("SUBPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_acquire_timeout_secs = parse_u64("SUBPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let db_busy_timeout_ms = parse_u64("SUBPULSE_DB_BUSY_TIMEOUT_MS", "5000")?;
    let request_timeout_secs = parse_u64("SUBPULSE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("SUBPULSE_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("SUBPULSE_RETRY_BACKOFF_BASE_MS", "1000")?;
    let shutdown_deadline_secs = parse_u64("SUBPULSE_SHUTDOWN_DEADLINE_SECS", "30")?;

    let reddit_client_id = non_empty("REDDIT_CLIENT_ID");
    let reddit_client_secret = non_empty("REDDIT_CLIENT_SECRET");
    let reddit_user_agent =
        non_empty("REDDIT_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        sources_path,
        export_dir,
        pool_size,
        db_max_connections,
        db_acquire_timeout_secs,
        db_busy_timeout_ms,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        shutdown_deadline_secs,
        reddit_client_id,
        reddit_client_secret,
        reddit_user_agent,
    })
}

/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

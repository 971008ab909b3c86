//! `subpulse status`: show the last outcome recorded for each source.

use subpulse_core::{AppConfig, SourceJobStatus};
use subpulse_db::Store;

/// # Errors
///
/// Returns an error if the store cannot be opened or queried.
pub(crate) async fn run_status(config: &AppConfig) -> anyhow::Result<()> {
    let store = crate::open_store(config).await?;
    let statuses = store.list_source_statuses().await?;

    if statuses.is_empty() {
        println!("no sources collected yet");
        return Ok(());
    }

    for status in &statuses {
        println!("{}", format_status_line(status));
    }

    let failed = statuses.iter().filter(|s| !s.status.is_completed()).count();
    if failed > 0 {
        println!("{failed} of {} sources failed their last run", statuses.len());
    }

    Ok(())
}

pub(crate) fn format_status_line(status: &SourceJobStatus) -> String {
    let when = chrono::DateTime::from_timestamp(status.last_collected, 0).map_or_else(
        || status.last_collected.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    format!("{:<24} {:<20} {}", status.source, when, status.status)
}

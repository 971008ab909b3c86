//! `subpulse export`: write a windowed JSON snapshot.

use std::path::PathBuf;

use anyhow::Context;
use subpulse_core::{AppConfig, ExportRequest};
use subpulse_ingest::{write_snapshot, Exporter};

/// Export posts from the last `days` days into `out` (or the configured
/// export directory).
///
/// # Errors
///
/// Returns an error if the store cannot be opened or queried, or the
/// snapshot file cannot be written.
pub(crate) async fn run_export(
    config: &AppConfig,
    days: u32,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let request = ExportRequest { days };
    let store = crate::open_store(config).await?;
    let dir = out.unwrap_or_else(|| config.export_dir.clone());

    let snapshot = Exporter::new(store)
        .export_window(request.days)
        .await
        .context("failed to build export snapshot")?;
    let path = write_snapshot(&snapshot, &dir)
        .await
        .context("failed to write export snapshot")?;

    println!(
        "exported {} posts and {} comments from the last {} days to {}",
        snapshot.metadata.post_count,
        snapshot.metadata.comment_count,
        request.days,
        path.display()
    );

    Ok(())
}

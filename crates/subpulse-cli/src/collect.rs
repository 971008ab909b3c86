//! `subpulse collect`: run the ingest pipeline over the configured sources.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use subpulse_core::{AppConfig, CollectionRequest};
use subpulse_ingest::Orchestrator;
use subpulse_reddit::{RedditClient, RedditClientConfig};
use subpulse_sentiment::LexiconScorer;

/// Collect the selected sources and print posts persisted per source.
///
/// # Errors
///
/// Returns an error if the sources file cannot be loaded, Reddit credentials
/// are missing, the store cannot be opened, or running sources outlive the
/// shutdown deadline. Per-source failures are recorded in the status table
/// and do not fail the command.
pub(crate) async fn run_collect(
    config: &AppConfig,
    source_filter: &[String],
    pool_size: Option<usize>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let configured = load_configured_requests(config, source_filter)?;
    let requests = select_requests(configured, source_filter);
    if requests.is_empty() {
        println!("no sources to collect");
        return Ok(());
    }

    let pool_size = pool_size.unwrap_or(config.pool_size).max(1);

    if dry_run {
        println!(
            "dry-run: would collect {} sources with pool size {pool_size}:",
            requests.len()
        );
        for r in &requests {
            println!(
                "  {} (sort={}, time={}, limit={}, comments={})",
                r.source,
                r.sort_method,
                r.time_filter,
                r.limit,
                if r.fetch_comments {
                    r.max_comments.to_string()
                } else {
                    "off".to_string()
                }
            );
        }
        return Ok(());
    }

    let reddit_config = RedditClientConfig::from_app_config(config)
        .context("collect needs REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET")?;
    let provider = Arc::new(RedditClient::new(&reddit_config)?);
    let store = crate::open_store(config).await?;

    let orchestrator = Orchestrator::new(provider, Arc::new(LexiconScorer::new()), store);
    let deadline = Duration::from_secs(config.shutdown_deadline_secs);

    match orchestrator
        .collect_until(&requests, pool_size, crate::shutdown_signal(), deadline)
        .await
    {
        Ok(results) => {
            print_results(&results);
            Ok(())
        }
        Err(elapsed) => {
            print_results(&elapsed.collected);
            Err(elapsed).context("collection did not shut down cleanly")
        }
    }
}

fn print_results(results: &HashMap<String, usize>) {
    let mut rows: Vec<(&String, &usize)> = results.iter().collect();
    rows.sort();
    let total: usize = results.values().sum();
    for (source, collected) in rows {
        println!("{source}: {collected} posts");
    }
    println!("collected {total} posts from {} sources", results.len());
}

/// Load the sources file.
///
/// A missing file is acceptable only when sources were named on the command
/// line.
fn load_configured_requests(
    config: &AppConfig,
    source_filter: &[String],
) -> anyhow::Result<Vec<CollectionRequest>> {
    if !source_filter.is_empty() && !config.sources_path.exists() {
        tracing::debug!(
            path = %config.sources_path.display(),
            "sources file not found, using defaults for named sources"
        );
        return Ok(Vec::new());
    }

    let file = subpulse_core::load_sources(&config.sources_path).with_context(|| {
        format!(
            "failed to load sources from {}",
            config.sources_path.display()
        )
    })?;
    Ok(file.sources)
}

/// Pick the requests to run.
///
/// With no filter every configured request runs. Otherwise each named source
/// uses its configured request when one exists (matched case-insensitively)
/// and default settings when not.
pub(crate) fn select_requests(
    configured: Vec<CollectionRequest>,
    source_filter: &[String],
) -> Vec<CollectionRequest> {
    if source_filter.is_empty() {
        return configured;
    }

    source_filter
        .iter()
        .map(|name| {
            configured
                .iter()
                .find(|r| r.source.eq_ignore_ascii_case(name))
                .cloned()
                .unwrap_or_else(|| {
                    tracing::info!(source = %name, "source not in sources file, using defaults");
                    CollectionRequest::for_source(name.clone())
                })
        })
        .collect()
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;

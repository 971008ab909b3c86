use super::*;

fn configured() -> Vec<CollectionRequest> {
    let mut top = CollectionRequest::for_source("programming");
    top.sort_method = "top".to_string();
    top.limit = 25;
    vec![CollectionRequest::for_source("rust"), top]
}

#[test]
fn no_filter_runs_every_configured_source() {
    let selected = select_requests(configured(), &[]);
    let sources: Vec<&str> = selected.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(sources, vec!["rust", "programming"]);
}

#[test]
fn filter_reuses_configured_settings_case_insensitively() {
    let selected = select_requests(configured(), &["Programming".to_string()]);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].source, "programming");
    assert_eq!(selected[0].sort_method, "top");
    assert_eq!(selected[0].limit, 25);
}

#[test]
fn unknown_named_source_gets_defaults() {
    let selected = select_requests(configured(), &["golang".to_string()]);
    assert_eq!(selected, vec![CollectionRequest::for_source("golang")]);
}

#[test]
fn missing_sources_file_is_fine_when_sources_are_named() {
    let config = subpulse_core::build_app_config(|key| match key {
        "SUBPULSE_SOURCES_PATH" => Ok("/nonexistent/sources.yaml".to_string()),
        _ => Err(std::env::VarError::NotPresent),
    })
    .unwrap();

    let loaded = load_configured_requests(&config, &["rust".to_string()]).unwrap();
    assert!(loaded.is_empty());

    let err = load_configured_requests(&config, &[]).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load sources"));
}

#[tokio::test]
async fn dry_run_needs_no_credentials_or_database() {
    let config = subpulse_core::build_app_config(|key| match key {
        "SUBPULSE_SOURCES_PATH" => Ok("/nonexistent/sources.yaml".to_string()),
        "DATABASE_URL" => Ok("sqlite:///nonexistent/dir/subpulse.db".to_string()),
        _ => Err(std::env::VarError::NotPresent),
    })
    .unwrap();

    run_collect(&config, &["rust".to_string()], Some(2), true)
        .await
        .expect("dry run should succeed");
}

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::types::CollectionRequest;
use crate::ConfigError;

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<CollectionRequest>,
}

/// Load and validate the source list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile = serde_yaml::from_str(&content)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for request in &sources_file.sources {
        let name = request.source.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if name.contains('/') || name.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "source '{name}' must not contain '/' or whitespace"
            )));
        }

        if request.limit == 0 {
            return Err(ConfigError::Validation(format!(
                "source '{name}' has limit 0; must be at least 1"
            )));
        }

        if !seen.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source: '{name}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write yaml");
        file
    }

    #[test]
    fn load_sources_applies_defaults() {
        let file = write_yaml(
            "sources:\n  - source: rust\n  - source: programming\n    sort_method: top\n    time_filter: week\n    limit: 25\n    fetch_comments: true\n    max_comments: 5\n",
        );
        let loaded = load_sources(file.path()).expect("valid sources file");
        assert_eq!(loaded.sources.len(), 2);

        let rust = &loaded.sources[0];
        assert_eq!(rust.source, "rust");
        assert_eq!(rust.sort_method, "hot");
        assert_eq!(rust.time_filter, "all");
        assert_eq!(rust.limit, 100);
        assert!(!rust.fetch_comments);

        let programming = &loaded.sources[1];
        assert_eq!(programming.sort_method, "top");
        assert_eq!(programming.time_filter, "week");
        assert_eq!(programming.limit, 25);
        assert!(programming.fetch_comments);
        assert_eq!(programming.max_comments, 5);
    }

    #[test]
    fn load_sources_reports_missing_file() {
        let err = load_sources(Path::new("/nonexistent/sources.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::SourcesFileIo { .. }));
    }

    #[test]
    fn validate_rejects_duplicate_sources_case_insensitively() {
        let file = SourcesFile {
            sources: vec![
                CollectionRequest::for_source("Rust"),
                CollectionRequest::for_source("rust"),
            ],
        };
        let err = validate_sources(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate source"));
    }

    #[test]
    fn validate_rejects_zero_limit() {
        let mut request = CollectionRequest::for_source("rust");
        request.limit = 0;
        let err = validate_sources(&SourcesFile {
            sources: vec![request],
        })
        .unwrap_err();
        assert!(err.to_string().contains("limit 0"));
    }

    #[test]
    fn validate_rejects_blank_and_path_like_names() {
        let blank = SourcesFile {
            sources: vec![CollectionRequest::for_source("  ")],
        };
        assert!(validate_sources(&blank).is_err());

        let pathy = SourcesFile {
            sources: vec![CollectionRequest::for_source("r/rust")],
        };
        assert!(validate_sources(&pathy).is_err());
    }

    #[test]
    fn unknown_sort_method_is_accepted_at_load_time() {
        let file = write_yaml("sources:\n  - source: rust\n    sort_method: best\n");
        let loaded = load_sources(file.path()).expect("unknown sort is not a load error");
        assert_eq!(loaded.sources[0].sort_method, "best");
    }

    #[test]
    fn shipped_sources_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/sources.yaml");
        let loaded = load_sources(&path).expect("config/sources.yaml should be valid");
        assert!(!loaded.sources.is_empty());
    }
}

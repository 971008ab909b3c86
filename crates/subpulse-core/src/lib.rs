//! Shared domain types, configuration, and capability interfaces for subpulse.

pub mod app_config;
pub mod config;
pub mod error;
pub mod provider;
pub mod sources;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use provider::{ContentProvider, ProviderError, RawComment, RawItem, SentimentProvider};
pub use sources::{load_sources, SourcesFile};
pub use types::{
    CollectionRequest, Comment, ExportRequest, Post, SentimentScores, SortMethod, SourceJobStatus,
    SourceStatus, TimeFilter,
};

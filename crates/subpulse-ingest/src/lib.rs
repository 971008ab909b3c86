//! The ingestion pipeline: per-source fetch runs, bounded multi-source
//! orchestration, and windowed export.

pub mod error;
pub mod export;
pub mod fetcher;
pub mod orchestrator;
pub mod shutdown;
pub mod validate;

pub use error::{DeadlineElapsed, ExportError, ValidationError};
pub use export::{write_snapshot, ExportMetadata, ExportSnapshot, ExportedPost, Exporter};
pub use fetcher::Fetcher;
pub use orchestrator::Orchestrator;
pub use shutdown::{ShutdownHandle, ShutdownSignal};

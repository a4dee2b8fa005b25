//! Shared types, error model, and configuration for ReconReport.
//!
//! This crate is the foundation depended on by all other ReconReport crates.
//! It provides:
//! - [`ReconReportError`]: the unified error type
//! - Domain types ([`Domain`], [`ExtractedRow`], [`ReportDocument`], [`RunManifest`])
//! - Configuration ([`AppConfig`], config loading, credential env lookup)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ChunkingConfig, CompletionConfig, OutputConfig, completion_endpoint, config_dir,
    config_file_path, init_config, load_config, load_config_from, read_api_keys,
};
pub use error::{ReconReportError, Result};
pub use types::{
    ArtifactMeta, CURRENT_SCHEMA_VERSION, ChunkStats, Domain, ExtractedRow, ReportDocument,
    ReportFormat, RunId, RunManifest,
};

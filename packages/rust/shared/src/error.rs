//! Error types for ReconReport.
//!
//! Library crates use [`ReconReportError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Per-chunk remote failures are not errors: they surface as
//! `CompletionResult` values and are contained by the pipeline.

use std::path::PathBuf;

/// Top-level error type for all ReconReport operations.
#[derive(Debug, thiserror::Error)]
pub enum ReconReportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The raw recon report could not be read. Fatal before any chunk work.
    #[error("raw report missing at {path:?}: {source}")]
    InputMissing {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Network/HTTP setup error (client construction, invalid endpoint).
    #[error("network error: {0}")]
    Network(String),

    /// The final document could not be written.
    #[error("failed to write report at {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty domain, unknown format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The run was cancelled at a chunk boundary.
    #[error("run cancelled before chunk {next_chunk} of {total}")]
    Cancelled { next_chunk: usize, total: usize },

    /// Every chunk was skipped and strict mode refuses an empty report.
    #[error("all {total} chunks were skipped; no findings to report")]
    AllChunksSkipped { total: usize },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReconReportError>;

impl ReconReportError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The raw report at `path` could not be read.
    pub fn input_missing(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InputMissing {
            path: path.into(),
            source,
        }
    }

    /// Writing an output artifact at `path` failed.
    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }
}

//! Core pipeline orchestration for ReconReport.
//!
//! Ties chunking, completion, parsing, merging and rendering together into
//! the end-to-end [`generate_report`] run.

pub mod document;
pub mod merge;
pub mod pipeline;
pub mod preview;

pub use document::{CANONICAL_TOOLS, DISCLAIMER, IP_SENTINEL, REPORT_TITLE, build};
pub use merge::{MergedTable, merge, merge_tools};
pub use pipeline::{
    ChunkStatus, Phase, ProgressReporter, ReportConfig, ReportResult, SilentProgress,
    generate_report,
};
pub use preview::{ChunkPreview, preview, preview_file};

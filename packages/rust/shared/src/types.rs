//! Core domain types for ReconReport runs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ReconReportError, Result};

/// Current schema version for the run manifest format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Suffix the upstream recon scripts append to raw dumps.
const RAW_REPORT_SUFFIX: &str = "_report.txt";

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// A normalized target domain (trimmed, lowercase, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Normalize and validate a user-supplied domain or IP.
    pub fn parse(raw: &str) -> Result<Self> {
        let domain = raw.trim().to_lowercase();
        if domain.is_empty() {
            return Err(ReconReportError::validation("domain must not be empty"));
        }
        if domain
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(ReconReportError::validation(format!(
                "invalid domain '{domain}': must not contain whitespace or path separators"
            )));
        }
        Ok(Self(domain))
    }

    /// Derive the domain from a raw dump path such as `output/example.com_report.txt`.
    pub fn from_report_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ReconReportError::validation(format!(
                    "cannot derive a domain from {}",
                    path.display()
                ))
            })?;

        let stem = file_name
            .strip_suffix(RAW_REPORT_SUFFIX)
            .or_else(|| file_name.strip_suffix(".txt"))
            .unwrap_or(file_name);

        Self::parse(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conventional location of the raw dump for this domain.
    pub fn raw_report_path(&self, input_dir: &Path) -> PathBuf {
        input_dir.join(format!("{}{RAW_REPORT_SUFFIX}", self.0))
    }

    /// Location of a rendered document for this domain.
    pub fn document_path(&self, output_dir: &Path, format: ReportFormat) -> PathBuf {
        output_dir.join(format!("{}_report.{}", self.0, format.extension()))
    }

    /// Location of the run manifest for this domain.
    pub fn manifest_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}_report.json", self.0))
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ReportFormat
// ---------------------------------------------------------------------------

/// Rendered document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Self-contained, printable HTML page.
    Html,
    /// GitHub-flavored Markdown.
    Markdown,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ReconReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(ReconReportError::validation(format!(
                "unknown report format '{other}': expected 'html' or 'markdown'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Rows and the final document
// ---------------------------------------------------------------------------

/// A single key/value finding parsed from one completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRow {
    pub key: String,
    pub value: String,
}

impl ExtractedRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The assembled report, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    /// Document title.
    pub title: String,
    /// Target domain.
    pub domain: Domain,
    /// Value of the `IP` row, or the `N/A` sentinel.
    pub ip_address: String,
    /// Deduplicated findings in first-seen order.
    pub rows: Vec<ExtractedRow>,
    /// Tools listed in the "Tools Used" section.
    pub tools: Vec<String>,
    /// Trailing disclaimer printed under the tool list.
    pub disclaimer: String,
}

// ---------------------------------------------------------------------------
// Run manifest
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-run chunk accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkStats {
    /// Chunks produced by the splitter.
    pub total: usize,
    /// Chunks with a successful completion.
    pub completed: usize,
    /// Chunks dropped after failed or rate-limited attempts.
    pub skipped: usize,
    /// Chunks with nothing left after cleanup (no remote call made).
    pub empty: usize,
}

/// Checksum and size of one written artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// The `<domain>_report.json` sidecar written next to the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Unique identifier for this run.
    pub run_id: RunId,
    /// Target domain.
    pub domain: Domain,
    /// Completion model used.
    pub model: String,
    /// Tool version that produced the report.
    pub tool_version: String,
    /// When the report was written.
    pub generated_at: DateTime<Utc>,
    /// Chunk accounting.
    pub chunks: ChunkStats,
    /// Rows in the merged table.
    pub row_count: usize,
    /// Tool names the model reported. Informational; the document uses the canonical list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extracted_tools: Vec<String>,
    /// Rendered documents.
    #[serde(default)]
    pub artifacts: Vec<ArtifactMeta>,
}

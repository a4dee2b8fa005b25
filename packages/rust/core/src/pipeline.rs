//! End-to-end `generate` pipeline: raw dump → chunks → completions → merged table → report.
//!
//! ```text
//! Reading → Chunking → PerChunk(0..n) → Merging → Building → Done
//! ```
//!
//! Chunks run strictly in order because the merge is first-write-wins.
//! Cancellation is honoured before every chunk and during a rate-limit backoff;
//! a cancelled run writes nothing.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use reconreport_completion::{ChunkOutcome, Completer, CredentialPool, RetryPolicy, SkipReason};
use reconreport_markdown::{DEFAULT_CHUNK_LIMIT, ParsedCompletion, parse_completion, prepare_chunks};
use reconreport_shared::{
    CURRENT_SCHEMA_VERSION, ChunkStats, CompletionConfig, Domain, ReconReportError, ReportFormat,
    Result, RunId, RunManifest,
};

use crate::document;
use crate::merge;

/// Configuration for one `generate_report` run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Target domain; names every output file.
    pub domain: Domain,
    /// Raw recon dump to read.
    pub input_path: PathBuf,
    /// Directory that receives the report and its manifest.
    pub output_dir: PathBuf,
    /// Formats to render.
    pub formats: Vec<ReportFormat>,
    /// Maximum characters per chunk.
    pub chunk_limit: usize,
    /// Rate-limit backoff policy.
    pub retry: RetryPolicy,
    /// Fail instead of writing an empty report when every chunk was skipped.
    pub strict: bool,
    /// Model identifier, recorded in the manifest.
    pub model: String,
    /// Tool version string.
    pub tool_version: String,
}

impl ReportConfig {
    /// Defaults for everything but the paths.
    pub fn new(domain: Domain, input_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            domain,
            input_path,
            output_dir,
            formats: vec![ReportFormat::Html, ReportFormat::Markdown],
            chunk_limit: DEFAULT_CHUNK_LIMIT,
            retry: RetryPolicy::default(),
            strict: false,
            model: CompletionConfig::default().model,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct ReportResult {
    pub run_id: RunId,
    pub domain: Domain,
    pub chunks: ChunkStats,
    /// Rows in the merged table.
    pub row_count: usize,
    /// Value shown on the IP line.
    pub ip_address: String,
    /// Rendered documents.
    pub documents: Vec<PathBuf>,
    pub manifest_path: PathBuf,
    pub elapsed: Duration,
}

/// Pipeline stage, reported to [`ProgressReporter::phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Reading,
    Chunking,
    PerChunk { index: usize, total: usize },
    Merging,
    Building,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => f.write_str("Reading raw report"),
            Self::Chunking => f.write_str("Chunking"),
            Self::PerChunk { index, total } => {
                write!(f, "Summarizing chunk {}/{}", index + 1, total)
            }
            Self::Merging => f.write_str("Merging rows"),
            Self::Building => f.write_str("Building report"),
            Self::Done => f.write_str("Done"),
        }
    }
}

/// How a single chunk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkStatus {
    Completed { rows: usize },
    Skipped(SkipReason),
    /// Nothing left after cleanup; no remote call was made.
    Empty,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, phase: Phase);
    /// Called after each chunk.
    fn chunk_finished(&self, index: usize, total: usize, status: &ChunkStatus);
    /// Called when the pipeline completes.
    fn done(&self, result: &ReportResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _phase: Phase) {}
    fn chunk_finished(&self, _index: usize, _total: usize, _status: &ChunkStatus) {}
    fn done(&self, _result: &ReportResult) {}
}

/// Run the full `generate` pipeline.
#[instrument(skip_all, fields(domain = %config.domain, input = %config.input_path.display()))]
pub async fn generate_report<C: Completer>(
    config: &ReportConfig,
    completer: &C,
    pool: &CredentialPool,
    cancel: &CancellationToken,
    progress: &dyn ProgressReporter,
) -> Result<ReportResult> {
    let start = Instant::now();
    let run_id = RunId::new();

    info!(%run_id, keys = pool.len(), "starting generate pipeline");

    // --- Reading ---
    progress.phase(Phase::Reading);
    let raw = tokio::fs::read_to_string(&config.input_path)
        .await
        .map_err(|e| ReconReportError::input_missing(&config.input_path, e))?;

    // --- Chunking ---
    progress.phase(Phase::Chunking);
    let chunks = prepare_chunks(&raw, config.chunk_limit);
    let total = chunks.len();
    let mut stats = ChunkStats {
        total,
        ..ChunkStats::default()
    };
    info!(bytes = raw.len(), chunks = total, "raw report chunked");

    // --- Per chunk ---
    let mut parsed: Vec<ParsedCompletion> = Vec::with_capacity(total);

    for chunk in &chunks {
        if cancel.is_cancelled() {
            info!(next_chunk = chunk.index, total, "cancelled at chunk boundary");
            return Err(ReconReportError::Cancelled {
                next_chunk: chunk.index,
                total,
            });
        }

        progress.phase(Phase::PerChunk {
            index: chunk.index,
            total,
        });

        let status = if chunk.text.trim().is_empty() {
            debug!(chunk = chunk.index, "chunk empty after cleanup, not sent");
            stats.empty += 1;
            ChunkStatus::Empty
        } else {
            let outcome = reconreport_completion::run_chunk(
                completer,
                pool,
                &config.retry,
                cancel,
                chunk.index,
                &chunk.text,
                &config.domain,
            )
            .await;

            match outcome {
                ChunkOutcome::Completed { text, attempts } => {
                    let result = parse_completion(&text);
                    if result.rows.is_empty() {
                        info!(chunk = chunk.index, "completion yielded no table rows");
                    }
                    debug!(
                        chunk = chunk.index,
                        attempts,
                        rows = result.rows.len(),
                        tools = result.tools.len(),
                        "chunk completed"
                    );
                    stats.completed += 1;
                    let rows = result.rows.len();
                    parsed.push(result);
                    ChunkStatus::Completed { rows }
                }
                ChunkOutcome::Skipped {
                    reason: SkipReason::Cancelled,
                    ..
                } => {
                    return Err(ReconReportError::Cancelled {
                        next_chunk: chunk.index,
                        total,
                    });
                }
                ChunkOutcome::Skipped { reason, attempts } => {
                    warn!(chunk = chunk.index, attempts, %reason, "chunk skipped");
                    stats.skipped += 1;
                    ChunkStatus::Skipped(reason)
                }
            }
        };

        progress.chunk_finished(chunk.index, total, &status);
    }

    if config.strict && stats.skipped > 0 && stats.completed == 0 {
        return Err(ReconReportError::AllChunksSkipped { total });
    }

    // --- Merging ---
    progress.phase(Phase::Merging);
    let (rows_per_chunk, tools_per_chunk): (Vec<_>, Vec<_>) =
        parsed.into_iter().map(|p| (p.rows, p.tools)).unzip();
    let table = merge::merge(rows_per_chunk);
    let extracted_tools = merge::merge_tools(tools_per_chunk);
    debug!(rows = table.len(), tools = extracted_tools.len(), "rows merged");

    // --- Building ---
    progress.phase(Phase::Building);
    let doc = document::build(&table, &config.domain);

    let manifest = RunManifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        run_id: run_id.clone(),
        domain: config.domain.clone(),
        model: config.model.clone(),
        tool_version: config.tool_version.clone(),
        generated_at: chrono::Utc::now(),
        chunks: stats,
        row_count: table.len(),
        extracted_tools: extracted_tools.into_iter().collect(),
        artifacts: Vec::new(),
    };

    let written =
        reconreport_artifacts::write_report(&config.output_dir, &doc, &config.formats, manifest)?;

    let result = ReportResult {
        run_id,
        domain: config.domain.clone(),
        chunks: stats,
        row_count: table.len(),
        ip_address: doc.ip_address,
        documents: written.documents,
        manifest_path: written.manifest_path,
        elapsed: start.elapsed(),
    };

    progress.phase(Phase::Done);
    progress.done(&result);

    info!(
        run_id = %result.run_id,
        completed = stats.completed,
        skipped = stats.skipped,
        empty = stats.empty,
        rows = result.row_count,
        elapsed_ms = result.elapsed.as_millis(),
        "generate pipeline complete"
    );

    Ok(result)
}

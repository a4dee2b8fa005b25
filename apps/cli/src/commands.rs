//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use reconreport_completion::{ChatCompletionClient, ClientOptions, CredentialPool, RetryPolicy};
use reconreport_core::pipeline::{
    ChunkStatus, Phase, ProgressReporter, ReportConfig, ReportResult,
};
use reconreport_shared::{
    AppConfig, Domain, ReportFormat, completion_endpoint, config_file_path, init_config,
    load_config, read_api_keys,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ReconReport: structured reports from raw recon output.
#[derive(Parser)]
#[command(
    name = "reconreport",
    version,
    about = "Summarize raw reconnaissance output into a deduplicated key/value report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where the raw dump comes from.
#[derive(clap::Args, Debug, Clone)]
pub(crate) struct TargetArgs {
    /// Target domain; reads `<input-dir>/<domain>_report.txt`.
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Explicit path to the raw dump. The domain is derived from the file name
    /// unless --domain is also given.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory holding `<domain>_report.txt` files (overrides config).
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Maximum characters per chunk (overrides config).
    #[arg(long)]
    pub chunk_limit: Option<usize>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate the report for a domain.
    Generate {
        #[command(flatten)]
        target: TargetArgs,

        /// Output directory for the report (overrides config).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output formats, comma-separated: html, markdown.
        #[arg(short, long, value_delimiter = ',')]
        format: Vec<ReportFormat>,

        /// Fail instead of writing an empty report when every chunk was skipped.
        #[arg(long)]
        strict: bool,

        /// Completion model (overrides config).
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show how the raw dump would be chunked and cleaned, without remote calls.
    Preview {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "reconreport=info",
        1 => "reconreport=debug",
        _ => "reconreport=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            target,
            out,
            format,
            strict,
            model,
        } => cmd_generate(&target, out, format, strict, model).await,
        Command::Preview { target } => cmd_preview(&target),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Resolve the domain and raw dump path from `--domain` / `--input`.
fn resolve_target(target: &TargetArgs, config: &AppConfig) -> Result<(Domain, PathBuf)> {
    let input_dir = target
        .input_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.input_dir));

    match (&target.domain, &target.input) {
        (Some(domain), Some(input)) => Ok((Domain::parse(domain)?, input.clone())),
        (Some(domain), None) => {
            let domain = Domain::parse(domain)?;
            let input = domain.raw_report_path(&input_dir);
            Ok((domain, input))
        }
        (None, Some(input)) => Ok((Domain::from_report_path(input)?, input.clone())),
        (None, None) => Err(eyre!("either --domain or --input is required")),
    }
}

async fn cmd_generate(
    target: &TargetArgs,
    out: Option<PathBuf>,
    formats: Vec<ReportFormat>,
    strict: bool,
    model: Option<String>,
) -> Result<()> {
    let config = load_config()?;

    // Credentials and endpoint are checked before any input is touched
    let pool = CredentialPool::from_csv(&read_api_keys(&config)?)?;
    let endpoint = completion_endpoint(&config)?;

    let (domain, input_path) = resolve_target(target, &config)?;
    let model = model.unwrap_or_else(|| config.completion.model.clone());

    let client = ChatCompletionClient::new(ClientOptions {
        endpoint,
        model: model.clone(),
        timeout: Duration::from_secs(config.completion.timeout_secs),
    })?;

    let mut report_config = ReportConfig::new(
        domain.clone(),
        input_path,
        out.unwrap_or_else(|| PathBuf::from(&config.output.output_dir)),
    );
    report_config.formats = if formats.is_empty() {
        config.output.formats.clone()
    } else {
        formats
    };
    report_config.chunk_limit = target.chunk_limit.unwrap_or(config.chunking.char_limit);
    report_config.retry = RetryPolicy::new(Duration::from_secs(config.completion.backoff_secs));
    report_config.strict = strict || config.output.strict;
    report_config.model = model;

    info!(
        %domain,
        input = %report_config.input_path.display(),
        keys = pool.len(),
        "generating report"
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping at the next chunk boundary");
            on_interrupt.cancel();
        }
    });

    let reporter = CliProgress::new();
    let result = reconreport_core::generate_report(
        &report_config,
        &client,
        &pool,
        &cancel,
        &reporter,
    )
    .await;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            reporter.abandon();
            return Err(e.into());
        }
    };

    println!();
    println!("  Report generated for {}", result.domain);
    println!("  Run:      {}", result.run_id);
    println!(
        "  Chunks:   {} total, {} completed, {} skipped, {} empty",
        result.chunks.total, result.chunks.completed, result.chunks.skipped, result.chunks.empty
    );
    println!("  Rows:     {}", result.row_count);
    println!("  IP:       {}", result.ip_address);
    for path in &result.documents {
        println!("  Output:   {}", path.display());
    }
    println!("  Manifest: {}", result.manifest_path.display());
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_preview(target: &TargetArgs) -> Result<()> {
    let config = load_config()?;
    let (domain, input_path) = resolve_target(target, &config)?;
    let limit = target.chunk_limit.unwrap_or(config.chunking.char_limit);

    let chunks = reconreport_core::preview_file(&input_path, limit)?;
    let sent = chunks.iter().filter(|c| c.would_send()).count();

    println!();
    println!("  {domain}: {} chunks (limit {limit}), {sent} would be sent", chunks.len());
    println!();
    println!("  {:>5}  {:>9}  {:>9}  {:>11}  send", "chunk", "raw", "cleaned", "lines kept");
    for c in &chunks {
        println!(
            "  {:>5}  {:>9}  {:>9}  {:>5}/{:<5}  {}",
            c.index,
            c.raw_chars,
            c.cleaned_chars,
            c.kept_lines,
            c.raw_lines,
            if c.would_send() { "yes" } else { "no" }
        );
    }
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("# {}", config_file_path()?.display());
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn abandon(&self) {
        self.spinner.abandon();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, phase: Phase) {
        self.spinner.set_message(phase.to_string());
    }

    fn chunk_finished(&self, index: usize, total: usize, status: &ChunkStatus) {
        let line = match status {
            ChunkStatus::Completed { rows } => format!("chunk {}/{total}: {rows} rows", index + 1),
            ChunkStatus::Skipped(reason) => format!("chunk {}/{total}: skipped ({reason})", index + 1),
            ChunkStatus::Empty => format!("chunk {}/{total}: empty after cleanup", index + 1),
        };
        self.spinner.println(format!("  {line}"));
    }

    fn done(&self, _result: &ReportResult) {
        self.spinner.finish_and_clear();
    }
}

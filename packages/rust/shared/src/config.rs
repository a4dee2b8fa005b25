//! Application configuration for ReconReport.
//!
//! User config lives at `~/.reconreport/reconreport.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored here, only the name of the env var holding them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ReconReportError, Result};
use crate::types::ReportFormat;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "reconreport.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".reconreport";

// ---------------------------------------------------------------------------
// Config structs (matching reconreport.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote completion service settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Chunking policy.
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Input/output locations and formats.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[completion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the env var holding the comma-separated API keys.
    #[serde(default = "default_api_keys_env")]
    pub api_keys_env: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Wait before retrying a rate-limited chunk, in seconds.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_keys_env: default_api_keys_env(),
            timeout_secs: default_timeout_secs(),
            backoff_secs: default_backoff_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".into()
}
fn default_model() -> String {
    "llama3-70b-8192".into()
}
fn default_api_keys_env() -> String {
    "GROQ_KEYS".into()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_backoff_secs() -> u64 {
    5
}

/// `[chunking]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    #[serde(default = "default_char_limit")]
    pub char_limit: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            char_limit: default_char_limit(),
        }
    }
}

fn default_char_limit() -> usize {
    5000
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory holding `<domain>_report.txt` raw dumps.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Directory the rendered report is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Rendered document formats.
    #[serde(default = "default_formats")]
    pub formats: Vec<ReportFormat>,

    /// Fail instead of writing an empty report when every chunk is skipped.
    #[serde(default)]
    pub strict: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            formats: default_formats(),
            strict: false,
        }
    }
}

fn default_input_dir() -> String {
    "output".into()
}
fn default_output_dir() -> String {
    ".".into()
}
fn default_formats() -> Vec<ReportFormat> {
    vec![ReportFormat::Html, ReportFormat::Markdown]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.reconreport/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ReconReportError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.reconreport/reconreport.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ReconReportError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ReconReportError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ReconReportError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ReconReportError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ReconReportError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the raw comma-separated API key list from the configured env var.
pub fn read_api_keys(config: &AppConfig) -> Result<String> {
    let var_name = &config.completion.api_keys_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(ReconReportError::config(format!(
            "completion API keys not found. Set the {var_name} environment variable \
             to a comma-separated list of keys."
        ))),
    }
}

/// Parse and validate the configured completion endpoint.
pub fn completion_endpoint(config: &AppConfig) -> Result<Url> {
    let raw = &config.completion.endpoint;
    let url = Url::parse(raw)
        .map_err(|e| ReconReportError::config(format!("invalid completion endpoint '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ReconReportError::config(format!(
            "completion endpoint must be http(s), got '{other}'"
        ))),
    }
}

//! ReconReport CLI: turn raw recon dumps into structured reports.
//!
//! Splits a multi-tool reconnaissance dump into chunks, summarizes each with
//! a chat-completion model under a rotating key pool, and writes a
//! deduplicated key/value report.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

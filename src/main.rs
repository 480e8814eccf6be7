// streamview - Viewer for AI assistant run transcripts
//
// Reads transcripts (ordered streams of JSON events emitted by an assistant
// run) and presents them either formatted, one display-ready message per
// event, or raw, as the original pretty-printed JSON.
//
// Architecture:
// - Transcripts: local directory of JSON / JSON Lines files, or a remote server
// - Interpreter: pure event -> RenderableMessage mapping, HTML-escaped bodies
// - View: presentation mode, fetch generations, projections
// - Server (axum): read-only JSON API over a transcript source
// - CLI (clap): serve / list / view / export / config

mod cli;
mod config;
mod events;
mod interpreter;
mod logging;
mod refresh;
mod server;
mod transcripts;
mod util;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Config commands must work even when the config file is broken
    if cli.is_config_command() {
        return cli::handle_config(&cli);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env().context("Failed to load configuration")?;

    // Guard flushes the file log on drop; keep it for the whole run
    let _log_guard = logging::init(&config.logging);

    tracing::debug!(
        "Loaded config: log_dir={}, remote={:?}, tz={}",
        config.log_dir.display(),
        config.remote_url,
        config.display.timezone
    );

    cli::run(cli, config).await
}

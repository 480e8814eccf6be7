// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - serve: HTTP API over the transcript source
// - list: transcript summaries, optionally refreshed on a timer
// - view: one transcript, formatted or raw
// - export: pretty-printed content array to a file or stdout
// - config: show / locate / reset the config file

use crate::config::{Config, VERSION};
use crate::interpreter::{clock::DisplayZone, Interpreter};
use crate::refresh::RefreshScheduler;
use crate::server::{self, AppState};
use crate::transcripts::{
    filter_summaries, LocalStore, RemoteSource, TranscriptSource, TranscriptSummary,
};
use crate::view::{render_html, PresentationMode, Projection, ViewState};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// streamview - viewer for AI assistant run transcripts
#[derive(Debug, Parser)]
#[command(name = "streamview")]
#[command(version = VERSION)]
#[command(about = "View AI assistant run transcripts", long_about = None)]
pub struct Cli {
    /// Read transcripts from a remote `streamview serve` instead of the log directory
    #[arg(long, global = true, value_name = "URL")]
    pub remote: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve transcripts over HTTP
    Serve {
        /// Address to bind (overrides config)
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// List transcripts, newest first
    List {
        /// Only show transcripts whose filename, issue or timestamp contains this
        #[arg(long, value_name = "QUERY")]
        filter: Option<String>,

        /// Keep refreshing the list until Ctrl-C
        #[arg(long)]
        watch: bool,

        /// Refresh interval in milliseconds (overrides config)
        #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },

    /// Show one transcript
    View {
        filename: String,

        /// Show the original events instead of formatted messages
        #[arg(long)]
        raw: bool,

        /// Print the projection as JSON instead of HTML
        #[arg(long)]
        json: bool,

        /// Time zone for timestamps: utc, local or +HH:MM (overrides config)
        #[arg(long, value_name = "ZONE")]
        tz: Option<DisplayZone>,
    },

    /// Export a transcript's events as pretty-printed JSON
    Export {
        filename: String,

        /// Write to this file instead of stdout
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,
    },
}

impl Cli {
    /// Config commands run before configuration is loaded so a broken
    /// file can still be inspected and reset
    pub fn is_config_command(&self) -> bool {
        matches!(self.command, Commands::Config { .. })
    }
}

/// Handle `streamview config`
pub fn handle_config(cli: &Cli) -> Result<()> {
    match cli.command {
        Commands::Config { show, path, reset } => config_command(show, path, reset),
        _ => bail!("not a config command"),
    }
}

fn config_command(show: bool, path: bool, reset: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show()
    } else if reset {
        handle_config_reset()
    } else {
        println!("Usage: streamview config [--show|--path|--reset]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --path    Show config file path");
        println!("  --reset   Reset config file to defaults");
        Ok(())
    }
}

/// Run a transcript command with loaded configuration
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let remote = cli.remote.clone();

    match cli.command {
        Commands::Serve { bind } => {
            let source = open_source(remote.as_deref(), &config)?;
            serve(bind.unwrap_or(config.bind_addr), source, &config).await
        }
        Commands::List {
            filter,
            watch,
            interval,
        } => {
            let source = open_source(remote.as_deref(), &config)?;
            let mut scheduler = RefreshScheduler::from_config(&config.refresh)
                .with_enabled(watch && config.refresh.enabled);
            if let Some(ms) = interval {
                scheduler = scheduler.with_interval(Duration::from_millis(ms));
            }
            if watch && !config.refresh.enabled {
                tracing::info!("Auto-refresh is disabled in config; listing once");
            }
            list(source, filter, scheduler).await
        }
        Commands::View {
            filename,
            raw,
            json,
            tz,
        } => {
            let source = open_source(remote.as_deref(), &config)?;
            let interpreter = Interpreter::new(tz.unwrap_or(config.display.timezone));
            view(&source, &filename, raw, json, &interpreter).await
        }
        Commands::Export { filename, output } => {
            let source = open_source(remote.as_deref(), &config)?;
            export(&source, &filename, output).await
        }
        Commands::Config { show, path, reset } => config_command(show, path, reset),
    }
}

/// `--remote` > config `remote_url` > local log directory
fn open_source(remote: Option<&str>, config: &Config) -> Result<TranscriptSource> {
    match remote.or(config.remote_url.as_deref()) {
        Some(url) => Ok(TranscriptSource::Remote(RemoteSource::new(url)?)),
        None => Ok(TranscriptSource::Local(LocalStore::new(&config.log_dir))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transcript commands
// ─────────────────────────────────────────────────────────────────────────────

async fn serve(bind_addr: SocketAddr, source: TranscriptSource, config: &Config) -> Result<()> {
    let state = AppState::new(source, Interpreter::new(config.display.timezone));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl-C, shutting down"),
            Err(e) => {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
        let _ = shutdown_tx.send(());
    });

    server::start_server(bind_addr, state, shutdown_rx).await
}

async fn list(
    source: TranscriptSource,
    filter: Option<String>,
    scheduler: RefreshScheduler,
) -> Result<()> {
    let source = Arc::new(source);
    let watching = scheduler.is_enabled();
    if watching {
        tracing::debug!("Refreshing every {:?}", scheduler.interval());
    }
    let mut last_error = None;

    let fetch = {
        let source = source.clone();
        move || {
            let source = source.clone();
            async move { source.list().await }
        }
    };

    scheduler
        .run(
            fetch,
            |result| match result {
                Ok(summaries) => {
                    let shown = match filter.as_deref() {
                        Some(query) => filter_summaries(&summaries, query),
                        None => summaries,
                    };
                    if watching {
                        println!("── {} ──", chrono::Local::now().format("%H:%M:%S"));
                    }
                    print!("{}", format_summaries(&shown));
                    last_error = None;
                }
                Err(e) if watching => eprintln!("Error: {:#}", e),
                Err(e) => last_error = Some(e),
            },
            async {
                let _ = tokio::signal::ctrl_c().await;
            },
        )
        .await;

    match last_error {
        Some(e) => Err(e.context(format!("Failed to list transcripts from {}", source.describe()))),
        None => Ok(()),
    }
}

async fn view(
    source: &TranscriptSource,
    filename: &str,
    raw: bool,
    json: bool,
    interpreter: &Interpreter,
) -> Result<()> {
    let mut state = ViewState::new();
    let ticket = state.begin_open();
    let transcript = source.fetch(filename).await?;
    state.open(ticket, transcript);
    if let Some(open) = state.current() {
        tracing::debug!("Opened {} ({} events)", open.filename, open.content.len());
    }

    if raw && state.mode() == PresentationMode::Formatted {
        state.toggle_mode();
    }

    let projection = state
        .projection(interpreter)
        .with_context(|| format!("Transcript {} is not open", filename))?;

    let output = if json {
        serde_json::to_string_pretty(&projection).context("Failed to serialize projection")?
    } else {
        match &projection {
            Projection::Raw { raw } => raw.clone(),
            Projection::Formatted { .. } => render_html(&projection),
        }
    };

    write_stdout(&output)
}

async fn export(source: &TranscriptSource, filename: &str, output: Option<PathBuf>) -> Result<()> {
    let transcript = source.fetch(filename).await?;
    let body = transcript.export_json()?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, format!("{}\n", body))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Exported {} to {}", filename, path.display());
            Ok(())
        }
        None => write_stdout(&body),
    }
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text.trim_end_matches('\n')).context("Failed to write output")?;
    stdout.flush().context("Failed to write output")
}

/// One line per transcript: status, timestamp, filename, issue
fn format_summaries(summaries: &[TranscriptSummary]) -> String {
    if summaries.is_empty() {
        return "No transcripts found.\n".to_string();
    }

    let name_width = summaries
        .iter()
        .map(|s| s.filename.chars().count())
        .max()
        .unwrap_or(0);

    summaries
        .iter()
        .map(|s| {
            format!(
                "{:<8} {:<20} {:<width$}  {}\n",
                s.status,
                s.timestamp,
                s.filename,
                s.issue,
                width = name_width
            )
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Config commands
// ─────────────────────────────────────────────────────────────────────────────

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read confirmation")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    Config::default().save()?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

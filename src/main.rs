//! procmem - version 0.1.0
//!
//! Diagnostic front-end printing this process's own memory metrics.

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, Level};

use cli::{Args, Commands, LogLevel, OutputFormat};
use commands::{command_check, command_config, command_show, command_threads};
use procmem::{install, load_config, ProbeConfig};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(args: &Args) {
    let log_level = match args.log_level {
        LogLevel::Off => None,
        LogLevel::Error => Some(Level::ERROR),
        LogLevel::Warn => Some(Level::WARN),
        LogLevel::Info => Some(Level::INFO),
        LogLevel::Debug => Some(Level::DEBUG),
        LogLevel::Trace => Some(Level::TRACE),
    };
    let Some(log_level) = log_level else {
        return;
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
    }

    debug!("Logging initialized with level: {:?}", args.log_level);
}

fn resolve_config(args: &Args) -> Result<ProbeConfig> {
    if args.no_config {
        return Ok(ProbeConfig::default());
    }
    load_config(args.config.as_deref()).context("Failed to load configuration")
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args);

    let config = resolve_config(&args)?;
    install(&config).context("Failed to select memory probe")?;

    let command = args.command.unwrap_or(Commands::Show {
        format: OutputFormat::Text,
        count: 1,
        interval_ms: 1000,
    });

    match command {
        Commands::Show {
            format,
            count,
            interval_ms,
        } => command_show(format, count, interval_ms),
        Commands::Check => command_check(),
        Commands::Threads { format } => command_threads(format),
        Commands::Config { format } => command_config(&config, format),
    }
}

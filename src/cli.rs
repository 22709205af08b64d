//! CLI arguments and subcommands for procmem.
//!
//! This module defines the command-line interface structure using the clap library.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "procmem",
    about = "Report this process's memory metrics without special privileges",
    long_about = "Report this process's memory metrics without special privileges.\n\n\
                  Shows virtual size, resident size, major page faults and, on Linux, \
                  the data/code/shared/stack segment breakdown, using the best probe \
                  available on the current platform.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the current memory sample (default)
    Show {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Number of samples to print
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Delay between samples in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },

    /// Report which probe is active and whether metrics are available
    Check,

    /// List the threads of this process
    Threads {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Config {
        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: OutputFormat,
    },
}

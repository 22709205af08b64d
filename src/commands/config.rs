//! Config command implementation.

use anyhow::Result;

use super::render;
use crate::cli::OutputFormat;
use procmem::ProbeConfig;

/// Prints the effective configuration (text falls back to YAML).
pub fn command_config(config: &ProbeConfig, format: OutputFormat) -> Result<()> {
    let format = match format {
        OutputFormat::Text => OutputFormat::Yaml,
        other => other,
    };
    if let Some(output) = render(config, format)? {
        println!("{output}");
    }
    Ok(())
}

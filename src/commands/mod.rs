//! CLI command implementations for procmem.
//!
//! This module provides implementations for all CLI subcommands:
//! - `show`: Print the memory sample
//! - `check`: Probe selection and availability
//! - `threads`: Thread listing
//! - `config`: Effective configuration

pub mod check;
pub mod config;
pub mod show;
pub mod threads;

use anyhow::Result;
use serde::Serialize;

use crate::cli::OutputFormat;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use show::command_show;
pub use threads::command_threads;

/// Renders `value` as YAML, JSON or TOML. Returns `None` for text output,
/// which each command formats itself.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    let output = match format {
        OutputFormat::Text => return Ok(None),
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Toml => toml::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(Some(output))
}

/// Formats a byte count with a binary unit.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(1023), "1023 B");
        assert_eq!(human_bytes(1024), "1.0 KiB");
        assert_eq!(human_bytes(120 * 1024), "120.0 KiB");
        assert_eq!(human_bytes(3 * 1024 * 1024 / 2), "1.5 MiB");
    }

    #[test]
    fn test_render_text_is_none() {
        assert!(render(&1u32, OutputFormat::Text)
            .expect("render")
            .is_none());
        assert_eq!(
            render(&vec![1u32, 2], OutputFormat::Json)
                .expect("render")
                .as_deref(),
            Some("[\n  1,\n  2\n]")
        );
    }
}

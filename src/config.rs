//! Probe configuration.
//!
//! This module handles loading and validating [`ProbeConfig`] from files.
//! It supports YAML, JSON, and TOML formats; every field has a default so an
//! empty file is a valid config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::ConfigError;
use crate::probe::external::DEFAULT_PS_PATH;
use crate::probe::ProbeKind;

pub const DEFAULT_PROC_DIR: &str = "/proc/self";

/// Locations tried by [`load_config`] when no path is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "/etc/procmem/procmem.yaml",
    "/etc/procmem/procmem.yml",
    "/etc/procmem/procmem.json",
    "./procmem.yaml",
    "./procmem.yml",
    "./procmem.json",
    "./procmem.toml",
];

/// Settings used when the probe chain is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Directory holding the `stat` and `status` pseudo-files. Inside `/proc`
    /// only `/proc/self` is accepted; other values exist for test fixtures.
    pub proc_dir: PathBuf,

    /// Absolute path of the process-status tool.
    pub ps_path: PathBuf,

    /// Kill `ps` after this many milliseconds. Unset means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ps_timeout_ms: Option<u64>,

    /// Probes skipped during selection.
    pub disabled_probes: Vec<ProbeKind>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            proc_dir: PathBuf::from(DEFAULT_PROC_DIR),
            ps_path: PathBuf::from(DEFAULT_PS_PATH),
            ps_timeout_ms: None,
            disabled_probes: Vec::new(),
        }
    }
}

impl ProbeConfig {
    pub fn ps_timeout(&self) -> Option<Duration> {
        self.ps_timeout_ms.map(Duration::from_millis)
    }

    pub fn is_enabled(&self, kind: ProbeKind) -> bool {
        !self.disabled_probes.contains(&kind)
    }
}

/// Checks values serde cannot reject on its own.
pub fn validate_config(cfg: &ProbeConfig) -> Result<(), ConfigError> {
    if cfg!(unix) && !cfg.ps_path.is_absolute() {
        return Err(ConfigError::Invalid(format!(
            "ps_path must be absolute, got '{}'",
            cfg.ps_path.display()
        )));
    }
    if cfg.proc_dir.starts_with("/proc") && cfg.proc_dir != Path::new(DEFAULT_PROC_DIR) {
        return Err(ConfigError::Invalid(format!(
            "proc_dir must be {} (only this process is inspected), got '{}'",
            DEFAULT_PROC_DIR,
            cfg.proc_dir.display()
        )));
    }
    if cfg.ps_timeout_ms == Some(0) {
        return Err(ConfigError::Invalid(
            "ps_timeout_ms must be greater than 0 (omit it to disable the timeout)".into(),
        ));
    }
    if cfg.disabled_probes.contains(&ProbeKind::None) {
        return Err(ConfigError::Invalid(
            "'none' is the fallback probe and cannot be disabled".into(),
        ));
    }
    Ok(())
}

/// Parses config text, picking the format from `path`'s extension.
pub fn parse_config(path: &Path, content: &str) -> Result<ProbeConfig, ConfigError> {
    let config: ProbeConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        // Default to YAML; an empty YAML document is treated as all defaults
        _ if content.trim().is_empty() => ProbeConfig::default(),
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Loads and validates a config file.
///
/// With `None`, the first existing entry of [`DEFAULT_CONFIG_PATHS`] is used,
/// or the defaults when none exists.
pub fn load_config(path: Option<&Path>) -> Result<ProbeConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match DEFAULT_CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists()) {
            Some(p) => p.to_path_buf(),
            None => return Ok(ProbeConfig::default()),
        },
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = parse_config(&path, &content)?;
    validate_config(&config)?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let cfg = ProbeConfig::default();
        assert_eq!(cfg.proc_dir, PathBuf::from("/proc/self"));
        assert_eq!(cfg.ps_path, PathBuf::from("/bin/ps"));
        assert!(cfg.ps_timeout().is_none());
        assert!(cfg.is_enabled(ProbeKind::ProcFile));
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_load_yaml_partial() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procmem.yaml");
        fs::write(
            &path,
            "ps_timeout_ms: 250\ndisabled_probes:\n  - external_tool\n",
        )
        .expect("Failed to write config");

        let cfg = load_config(Some(&path)).expect("valid config");
        assert_eq!(cfg.ps_timeout(), Some(Duration::from_millis(250)));
        assert!(!cfg.is_enabled(ProbeKind::ExternalTool));
        assert_eq!(cfg.ps_path, PathBuf::from("/bin/ps"));
    }

    #[test]
    fn test_load_json_and_toml() {
        let dir = tempdir().expect("Failed to create temp dir");

        let json = dir.path().join("procmem.json");
        fs::write(&json, r#"{"ps_path": "/usr/bin/ps"}"#).expect("Failed to write config");
        let cfg = load_config(Some(&json)).expect("valid json");
        assert_eq!(cfg.ps_path, PathBuf::from("/usr/bin/ps"));

        let toml_path = dir.path().join("procmem.toml");
        fs::write(
            &toml_path,
            "proc_dir = \"/tmp/fake\"\ndisabled_probes = [\"proc_file\"]\n",
        )
        .expect("Failed to write config");
        let cfg = load_config(Some(&toml_path)).expect("valid toml");
        assert_eq!(cfg.proc_dir, PathBuf::from("/tmp/fake"));
        assert_eq!(cfg.disabled_probes, vec![ProbeKind::ProcFile]);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procmem.yaml");
        fs::write(&path, "").expect("Failed to write config");
        assert_eq!(load_config(Some(&path)).expect("valid"), ProbeConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = load_config(Some(&dir.path().join("absent.yaml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let relative = ProbeConfig {
            ps_path: PathBuf::from("ps"),
            ..Default::default()
        };
        if cfg!(unix) {
            assert!(matches!(validate_config(&relative), Err(ConfigError::Invalid(_))));
        }

        let zero_timeout = ProbeConfig {
            ps_timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(validate_config(&zero_timeout).is_err());

        let disable_none = ProbeConfig {
            disabled_probes: vec![ProbeKind::None],
            ..Default::default()
        };
        assert!(validate_config(&disable_none).is_err());
    }

    #[test]
    fn test_proc_dir_limited_to_own_process() {
        for other in ["/proc/1", "/proc", "/proc/self/task/1"] {
            let cfg = ProbeConfig {
                proc_dir: PathBuf::from(other),
                ..Default::default()
            };
            assert!(
                matches!(validate_config(&cfg), Err(ConfigError::Invalid(_))),
                "{} accepted",
                other
            );
        }

        let fixture = ProbeConfig {
            proc_dir: PathBuf::from("/tmp/fixture"),
            ..Default::default()
        };
        assert!(validate_config(&fixture).is_ok());

        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("procmem.yaml");
        fs::write(&path, "proc_dir: /proc/1\n").expect("Failed to write config");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_unknown_probe_name_rejected() {
        let result = parse_config(Path::new("x.yaml"), "disabled_probes: [magic]\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }
}

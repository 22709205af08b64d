//! Platform-specific ways of filling a [`MetricsSample`].
//!
//! This module provides:
//! - `procfs`: `/proc/self/stat` + `/proc/self/status` reader (Linux)
//! - `external`: `ps` invocation (BSD/macOS/Solaris fallback)
//! - `rusage`: `getrusage(RUSAGE_SELF)` (POSIX fallback)
//! - `win32`: `GetProcessMemoryInfo` (Windows)
//!
//! Each probe absorbs its own expected unavailability and reports it as
//! `false`; on failure the target sample is left untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sample::MetricsSample;

pub mod external;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod procfs;
#[cfg(unix)]
pub mod rusage;
#[cfg(windows)]
pub mod win32;

pub use external::{parse_ps_output, ExternalToolProbe};
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use procfs::{parse_stat, parse_status, ProcFileProbe, StatFields};
#[cfg(unix)]
pub use rusage::{ResourceUsage, ResourceUsageProbe};
#[cfg(windows)]
pub use win32::Win32Probe;

/// One mechanism for sampling this process's memory.
pub trait ProbeStrategy: Send + Sync {
    /// Which mechanism this is.
    fn kind(&self) -> ProbeKind;

    /// Fills `target` and returns true, or returns false and leaves `target`
    /// unmodified. Must not panic on missing files, tools or privileges.
    fn sample(&self, target: &mut MetricsSample) -> bool;
}

/// Tag naming each probe implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    ProcFile,
    ExternalTool,
    ResourceUsage,
    Win32,
    None,
}

impl ProbeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeKind::ProcFile => "proc_file",
            ProbeKind::ExternalTool => "external_tool",
            ProbeKind::ResourceUsage => "resource_usage",
            ProbeKind::Win32 => "win32",
            ProbeKind::None => "none",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probe pinned when nothing else works. Never succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProbe;

impl ProbeStrategy for NullProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::None
    }

    fn sample(&self, _target: &mut MetricsSample) -> bool {
        false
    }
}

//! Linux probe reading `/proc/self/stat` and `/proc/self/status`.
//!
//! Field positions follow proc(5), see also
//! Documentation/filesystems/proc.rst, table 1-4 ("Contents of the stat
//! fields"). Numbers below are the 1-based field numbers from that table.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{ProbeKind, ProbeStrategy};
use crate::error::ProbeError;
use crate::sample::{page_size, MetricsSample};

/// `majflt`: major faults of the process.
pub const STAT_FIELD_MAJFLT: usize = 12;
/// `vsize`: virtual memory size in bytes.
pub const STAT_FIELD_VSIZE: usize = 23;
/// `rss`: resident set size in pages.
pub const STAT_FIELD_RSS: usize = 24;

/// Status keys kept in `os_specific`, with their display labels.
pub const STATUS_LABELS: &[(&str, &str)] = &[
    ("VmPeak", "Peak virtual memory size"),
    ("VmSize", "Virtual memory size"),
    ("VmLck", "Locked memory size"),
    ("VmHWM", "Peak resident set size"),
    ("VmRSS", "Resident set size"),
    ("VmStk", "Size of stack segment"),
    ("VmData", "Size of data segment"),
    ("VmExe", "Size of code segment"),
    ("VmLib", "Shared library code size"),
    ("VmPTE", "Page table entries size"),
];

/// The fixed-offset values taken from the stat file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatFields {
    pub major_faults: u64,
    pub vsize_bytes: u64,
    pub rss_pages: u64,
}

/// Segment sizes (bytes) and labelled raw values from the status file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFields {
    pub data_segment: u64,
    pub code_segment: u64,
    pub shared_segment: u64,
    pub stack_segment: u64,
    pub os_specific: Vec<(String, String)>,
}

/// Parses kilobyte values from status lines ("  120 kB").
pub fn parse_kb_value(v: &str) -> Option<u64> {
    v.split_whitespace().next()?.parse().ok()
}

/// Parses the stat file contents.
///
/// The command name (field 2) may contain spaces, so counting starts after
/// its closing parenthesis when one is present.
pub fn parse_stat(content: &str) -> Result<StatFields, ProbeError> {
    let (rest, first_field) = match content.rfind(')') {
        Some(idx) => (&content[idx + 1..], 3),
        None => (content, 1),
    };
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    let field = |number: usize| -> Result<u64, ProbeError> {
        let token = tokens
            .get(number - first_field)
            .ok_or(ProbeError::TruncatedStat {
                fields: tokens.len() + first_field - 1,
            })?;
        token.parse().map_err(|_| ProbeError::MalformedStat {
            field: number,
            value: (*token).to_string(),
        })
    };

    Ok(StatFields {
        major_faults: field(STAT_FIELD_MAJFLT)?,
        vsize_bytes: field(STAT_FIELD_VSIZE)?,
        rss_pages: field(STAT_FIELD_RSS)?,
    })
}

/// Parses the status file contents. Lines that are not `key: value` or
/// carry an unparsable size are skipped.
pub fn parse_status(content: &str) -> StatusFields {
    let mut fields = StatusFields::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();

        let slot = match key {
            "VmData" => Some(&mut fields.data_segment),
            "VmExe" => Some(&mut fields.code_segment),
            "VmLib" => Some(&mut fields.shared_segment),
            "VmStk" => Some(&mut fields.stack_segment),
            _ => None,
        };
        if let (Some(slot), Some(kb)) = (slot, parse_kb_value(value)) {
            *slot = kb.saturating_mul(1024);
        }

        if let Some((_, label)) = STATUS_LABELS.iter().find(|(k, _)| *k == key) {
            fields
                .os_specific
                .push(((*label).to_string(), value.trim().to_string()));
        }
    }

    fields
}

/// Reads the stat/status pseudo-files of one process directory.
#[derive(Debug, Clone)]
pub struct ProcFileProbe {
    dir: PathBuf,
}

impl Default for ProcFileProbe {
    fn default() -> Self {
        Self::new("/proc/self")
    }
}

impl ProcFileProbe {
    /// Probe reading `<dir>/stat` and `<dir>/status`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_file(&self, name: &str) -> Result<String, ProbeError> {
        let path = self.dir.join(name);
        fs::read_to_string(&path).map_err(|source| ProbeError::Unavailable { path, source })
    }

    /// Reads both files and returns the parsed values.
    ///
    /// Both files are read before anything is parsed, so a missing status
    /// file fails the probe even when stat is readable.
    pub fn read(&self) -> Result<(StatFields, StatusFields), ProbeError> {
        let stat = self.read_file("stat")?;
        let status = self.read_file("status")?;
        Ok((parse_stat(&stat)?, parse_status(&status)))
    }
}

impl ProbeStrategy for ProcFileProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::ProcFile
    }

    fn sample(&self, target: &mut MetricsSample) -> bool {
        let (stat, status) = match self.read() {
            Ok(values) => values,
            Err(e) if e.is_format_violation() => {
                warn!("Unexpected stat format in {}: {}", self.dir.display(), e);
                return false;
            }
            Err(e) => {
                debug!("Proc file probe unavailable: {}", e);
                return false;
            }
        };

        target.vsz = stat.vsize_bytes;
        target.rss = stat.rss_pages.saturating_mul(page_size());
        target.pagefaults = stat.major_faults;
        target.data_segment = status.data_segment;
        target.code_segment = status.code_segment;
        target.shared_segment = status.shared_segment;
        target.stack_segment = status.stack_segment;
        target.os_specific = status.os_specific;
        true
    }
}

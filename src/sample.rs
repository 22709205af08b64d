//! Platform-independent memory sample and the process-wide page size.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Page size used when the platform cannot report one.
pub const FALLBACK_PAGE_SIZE: u64 = 4096;

#[cfg(unix)]
fn get_page_size() -> u64 {
    // SAFETY: sysconf is safe to call with _SC_PAGESIZE; -1 signals failure.
    let raw = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if raw > 0 {
        raw as u64
    } else {
        FALLBACK_PAGE_SIZE
    }
}

#[cfg(windows)]
fn get_page_size() -> u64 {
    use windows::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

    let mut info = SYSTEM_INFO::default();
    // SAFETY: GetSystemInfo only writes into the provided struct.
    unsafe { GetSystemInfo(&mut info) };
    if info.dwPageSize > 0 {
        info.dwPageSize as u64
    } else {
        FALLBACK_PAGE_SIZE
    }
}

#[cfg(not(any(unix, windows)))]
fn get_page_size() -> u64 {
    FALLBACK_PAGE_SIZE
}

/// Bytes per memory page, resolved once per process.
pub static PAGE_SIZE: Lazy<u64> = Lazy::new(|| {
    let size = get_page_size();
    if size.is_power_of_two() {
        size
    } else {
        FALLBACK_PAGE_SIZE
    }
});

/// Returns the process-wide page size in bytes.
pub fn page_size() -> u64 {
    *PAGE_SIZE
}

/// One snapshot of this process's memory metrics.
///
/// Every numeric field is best effort and 0 means "not measured". Only
/// [`MetricsSample::available`] tells a genuine zero apart from an
/// unsupported platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSample {
    pub pid: u32,
    /// Virtual address space size in bytes.
    pub vsz: u64,
    /// Resident set size in bytes.
    pub rss: u64,
    /// Cumulative major page faults.
    pub pagefaults: u64,
    pub data_segment: u64,
    pub code_segment: u64,
    pub shared_segment: u64,
    pub stack_segment: u64,
    /// Platform metrics without a common field, as (label, raw value).
    pub os_specific: Vec<(String, String)>,
    pub available: bool,
}

impl MetricsSample {
    /// Creates a zeroed sample for `pid`.
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            ..Default::default()
        }
    }

    /// Zeroes every measured field, keeping the pid.
    pub fn clear(&mut self) {
        *self = Self::new(self.pid);
    }

    /// Sum of the four segment fields.
    pub fn segments_total(&self) -> u64 {
        self.data_segment
            .saturating_add(self.code_segment)
            .saturating_add(self.shared_segment)
            .saturating_add(self.stack_segment)
    }

    /// True when every numeric field is 0 and no os-specific data is kept.
    pub fn is_zeroed(&self) -> bool {
        self.vsz == 0
            && self.rss == 0
            && self.pagefaults == 0
            && self.segments_total() == 0
            && self.os_specific.is_empty()
    }
}

//! Windows probe using `GetProcessMemoryInfo` on the current process.

use std::mem;
use tracing::debug;
use windows::Win32::System::ProcessStatus::{K32GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
use windows::Win32::System::Threading::GetCurrentProcess;

use super::{ProbeKind, ProbeStrategy};
use crate::sample::MetricsSample;

/// Page-file usage, working set and fault count. No segment detail.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Probe;

impl ProbeStrategy for Win32Probe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Win32
    }

    fn sample(&self, target: &mut MetricsSample) -> bool {
        let mut counters = PROCESS_MEMORY_COUNTERS {
            cb: mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32,
            ..Default::default()
        };

        // SAFETY: the pseudo handle from GetCurrentProcess needs no closing and
        // the counters struct is sized as declared in `cb`.
        let ok = unsafe {
            K32GetProcessMemoryInfo(
                GetCurrentProcess(),
                &mut counters,
                mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32,
            )
        };
        if !ok.as_bool() {
            debug!(
                "GetProcessMemoryInfo failed: {}",
                std::io::Error::last_os_error()
            );
            return false;
        }

        target.vsz = counters.PagefileUsage as u64;
        target.rss = counters.WorkingSetSize as u64;
        target.pagefaults = u64::from(counters.PageFaultCount);
        true
    }
}

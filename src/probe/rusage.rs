//! POSIX fallback probe using `getrusage(RUSAGE_SELF)`.
//!
//! Linux leaves most fields at zero; the BSDs fill the integral sizes too.
//! There is no virtual-size signal here, so `vsz` is reported equal to the
//! peak resident size.

use std::mem::MaybeUninit;
use tracing::debug;

use super::{ProbeKind, ProbeStrategy};
use crate::sample::MetricsSample;

/// Bytes per unit of `ru_maxrss` and the integral sizes.
#[cfg(any(target_os = "macos", target_os = "ios"))]
const RUSAGE_UNIT: u64 = 1;
#[cfg(not(any(target_os = "macos", target_os = "ios")))]
const RUSAGE_UNIT: u64 = 1024;

fn non_negative(v: libc::c_long) -> u64 {
    u64::try_from(v).unwrap_or(0)
}

/// The subset of `struct rusage` this probe maps, in raw units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    pub max_rss: u64,
    pub shared: u64,
    pub unshared_data: u64,
    pub unshared_stack: u64,
    pub major_faults: u64,
}

impl ResourceUsage {
    /// Queries the current process.
    pub fn current() -> Option<Self> {
        let mut usage = MaybeUninit::<libc::rusage>::zeroed();
        // SAFETY: getrusage only writes into the provided struct.
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
        if rc != 0 {
            debug!("getrusage failed: {}", std::io::Error::last_os_error());
            return None;
        }
        // SAFETY: getrusage returned 0, so the struct is initialized.
        Some(Self::from_raw(unsafe { &usage.assume_init() }))
    }

    pub fn from_raw(usage: &libc::rusage) -> Self {
        Self {
            max_rss: non_negative(usage.ru_maxrss),
            shared: non_negative(usage.ru_ixrss),
            unshared_data: non_negative(usage.ru_idrss),
            unshared_stack: non_negative(usage.ru_isrss),
            major_faults: non_negative(usage.ru_majflt),
        }
    }

    /// Writes the mapped values into `target` when `max_rss` is nonzero.
    pub fn apply(&self, target: &mut MetricsSample) -> bool {
        let rss = self.max_rss.saturating_mul(RUSAGE_UNIT);
        if rss == 0 {
            return false;
        }
        target.rss = rss;
        target.vsz = rss;
        target.data_segment = self.unshared_data.saturating_mul(RUSAGE_UNIT);
        target.shared_segment = self.shared.saturating_mul(RUSAGE_UNIT);
        target.stack_segment = self.unshared_stack.saturating_mul(RUSAGE_UNIT);
        target.pagefaults = self.major_faults;
        true
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ResourceUsageProbe;

impl ProbeStrategy for ResourceUsageProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::ResourceUsage
    }

    fn sample(&self, target: &mut MetricsSample) -> bool {
        let Some(usage) = ResourceUsage::current() else {
            return false;
        };
        let ok = usage.apply(target);
        if !ok {
            debug!("getrusage reported zero max RSS");
        }
        ok
    }
}

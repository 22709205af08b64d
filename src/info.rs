//! The object applications hold to read their own memory metrics.

use serde::Serialize;

use crate::chain::{active_probe, SharedProbe};
use crate::probe::ProbeKind;
use crate::sample::MetricsSample;

/// Memory metrics of the current process, sampled on construction and on
/// every [`ProcessMemoryInfo::update`].
///
/// Each instance owns its sample; share it across threads behind a lock if
/// several threads need to refresh it.
#[derive(Clone, Serialize)]
pub struct ProcessMemoryInfo {
    #[serde(flatten)]
    sample: MetricsSample,
    #[serde(serialize_with = "serialize_probe")]
    probe: SharedProbe,
}

fn serialize_probe<S: serde::Serializer>(probe: &SharedProbe, s: S) -> Result<S::Ok, S::Error> {
    probe.kind().serialize(s)
}

impl ProcessMemoryInfo {
    /// Samples using the probe pinned for this process.
    pub fn new() -> Self {
        Self::with_probe(active_probe())
    }

    /// Samples using a specific probe instead of the pinned one.
    pub fn with_probe(probe: SharedProbe) -> Self {
        let mut info = Self {
            sample: MetricsSample::new(std::process::id()),
            probe,
        };
        info.update();
        info
    }

    /// Refreshes every field. On failure all numeric fields are reset to 0
    /// and `available` becomes false.
    pub fn update(&mut self) -> bool {
        let ok = self.probe.sample(&mut self.sample);
        if !ok {
            self.sample.clear();
        }
        self.sample.available = ok;
        ok
    }

    pub fn pid(&self) -> u32 {
        self.sample.pid
    }

    pub fn vsz(&self) -> u64 {
        self.sample.vsz
    }

    pub fn rss(&self) -> u64 {
        self.sample.rss
    }

    pub fn pagefaults(&self) -> u64 {
        self.sample.pagefaults
    }

    pub fn data_segment(&self) -> u64 {
        self.sample.data_segment
    }

    pub fn code_segment(&self) -> u64 {
        self.sample.code_segment
    }

    pub fn shared_segment(&self) -> u64 {
        self.sample.shared_segment
    }

    pub fn stack_segment(&self) -> u64 {
        self.sample.stack_segment
    }

    pub fn os_specific(&self) -> &[(String, String)] {
        &self.sample.os_specific
    }

    pub fn available(&self) -> bool {
        self.sample.available
    }

    pub fn probe_kind(&self) -> ProbeKind {
        self.probe.kind()
    }

    /// The full last sample.
    pub fn sample(&self) -> &MetricsSample {
        &self.sample
    }
}

impl Default for ProcessMemoryInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessMemoryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessMemoryInfo")
            .field("probe", &self.probe.kind())
            .field("sample", &self.sample)
            .finish()
    }
}

/// Whether any probe works on this platform.
pub fn is_available() -> bool {
    ProcessMemoryInfo::new().available()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{NullProbe, ProbeStrategy};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Succeeds until switched off.
    struct TogglingProbe {
        ok: AtomicBool,
    }

    impl ProbeStrategy for TogglingProbe {
        fn kind(&self) -> ProbeKind {
            ProbeKind::ExternalTool
        }

        fn sample(&self, target: &mut MetricsSample) -> bool {
            if !self.ok.load(Ordering::SeqCst) {
                return false;
            }
            target.vsz = 8192;
            target.rss = 4096;
            target.pagefaults = 3;
            target.os_specific = vec![("Label".into(), "1".into())];
            true
        }
    }

    #[test]
    fn test_null_probe_gives_unavailable_zeroes() {
        let info = ProcessMemoryInfo::with_probe(Arc::new(NullProbe));
        assert!(!info.available());
        assert!(info.sample().is_zeroed());
        assert_eq!(info.pid(), std::process::id());
        assert_eq!(info.probe_kind(), ProbeKind::None);
    }

    #[test]
    fn test_failed_update_resets_values() {
        let probe = Arc::new(TogglingProbe {
            ok: AtomicBool::new(true),
        });
        let mut info = ProcessMemoryInfo::with_probe(probe.clone());
        assert!(info.available());
        assert_eq!(info.vsz(), 8192);
        assert_eq!(info.rss(), 4096);
        assert_eq!(info.pagefaults(), 3);
        assert_eq!(info.os_specific().len(), 1);

        probe.ok.store(false, Ordering::SeqCst);
        assert!(!info.update());
        assert!(!info.available());
        assert!(info.sample().is_zeroed());
        assert_eq!(info.pid(), std::process::id());

        probe.ok.store(true, Ordering::SeqCst);
        assert!(info.update());
        assert!(info.available());
    }

    #[test]
    fn test_serializes_flat_with_probe_name() {
        let info = ProcessMemoryInfo::with_probe(Arc::new(NullProbe));
        let value = serde_json::to_value(&info).expect("serialize");
        assert_eq!(value["probe"], "none");
        assert_eq!(value["available"], false);
        assert_eq!(value["rss"], 0);
    }

    #[test]
    fn test_is_available_matches_pinned_probe() {
        assert_eq!(is_available(), active_probe().kind() != ProbeKind::None);
    }
}

//! Probe selection, done once per process.
//!
//! Candidates are tried in priority order (richest data first); the first one
//! whose `sample` succeeds is pinned for the rest of the process lifetime.
//! When none succeeds the [`NullProbe`] is pinned. Selection is never
//! repeated, even if the environment changes later.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{validate_config, ProbeConfig};
use crate::error::ConfigError;
use crate::probe::{NullProbe, ProbeKind, ProbeStrategy};
use crate::sample::MetricsSample;

/// Shared handle to a probe implementation.
pub type SharedProbe = Arc<dyn ProbeStrategy>;

static ACTIVE: OnceCell<SharedProbe> = OnceCell::new();

/// Ordered list of candidate probes.
pub struct ProbeChain {
    candidates: Vec<SharedProbe>,
}

impl ProbeChain {
    pub fn new(candidates: Vec<SharedProbe>) -> Self {
        Self { candidates }
    }

    /// The candidates that can work on this platform, minus disabled ones.
    pub fn for_platform(config: &ProbeConfig) -> Self {
        let candidates = platform_candidates(config)
            .into_iter()
            .filter(|p| config.is_enabled(p.kind()))
            .collect();
        Self::new(candidates)
    }

    pub fn kinds(&self) -> Vec<ProbeKind> {
        self.candidates.iter().map(|p| p.kind()).collect()
    }

    /// Returns the first candidate that samples successfully, or the
    /// [`NullProbe`].
    pub fn select(self) -> SharedProbe {
        for probe in self.candidates {
            let mut scratch = MetricsSample::new(std::process::id());
            if probe.sample(&mut scratch) {
                info!("Pinned memory probe: {}", probe.kind());
                return probe;
            }
            debug!("Memory probe {} unavailable, trying next", probe.kind());
        }
        warn!("No memory probe available on this platform, metrics will read 0");
        Arc::new(NullProbe)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn platform_candidates(config: &ProbeConfig) -> Vec<SharedProbe> {
    use crate::probe::{ExternalToolProbe, ProcFileProbe, ResourceUsageProbe};

    vec![
        Arc::new(ProcFileProbe::new(&config.proc_dir)),
        Arc::new(
            ExternalToolProbe::ps(&config.ps_path, std::process::id())
                .with_timeout(config.ps_timeout()),
        ),
        Arc::new(ResourceUsageProbe),
    ]
}

#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
fn platform_candidates(config: &ProbeConfig) -> Vec<SharedProbe> {
    use crate::probe::{ExternalToolProbe, ResourceUsageProbe};

    vec![
        Arc::new(
            ExternalToolProbe::ps(&config.ps_path, std::process::id())
                .with_timeout(config.ps_timeout()),
        ),
        Arc::new(ResourceUsageProbe),
    ]
}

#[cfg(windows)]
fn platform_candidates(_config: &ProbeConfig) -> Vec<SharedProbe> {
    vec![Arc::new(crate::probe::Win32Probe)]
}

#[cfg(not(any(unix, windows)))]
fn platform_candidates(_config: &ProbeConfig) -> Vec<SharedProbe> {
    Vec::new()
}

/// The probe pinned for this process, selecting it with the default config
/// on first use. Concurrent first calls all observe the same probe.
pub fn active_probe() -> SharedProbe {
    ACTIVE
        .get_or_init(|| ProbeChain::for_platform(&ProbeConfig::default()).select())
        .clone()
}

/// Pins a probe using `config`. Fails if a probe is already pinned.
pub fn install(config: &ProbeConfig) -> Result<SharedProbe, ConfigError> {
    validate_config(config)?;

    let mut selected_here = false;
    let probe = ACTIVE.get_or_init(|| {
        selected_here = true;
        ProbeChain::for_platform(config).select()
    });

    if selected_here {
        Ok(probe.clone())
    } else {
        Err(ConfigError::AlreadyPinned)
    }
}

/// Kind of the pinned probe, if selection already happened.
pub fn pinned_kind() -> Option<ProbeKind> {
    ACTIVE.get().map(|p| p.kind())
}

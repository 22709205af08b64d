//! Process Memory Introspection Library
//!
//! Reports the current process's virtual size, resident size, major page
//! faults and, where the platform exposes it, a per-segment breakdown. No
//! elevated privileges are needed; only the calling process is inspected.
//!
//! # Probes
//!
//! - **Linux**: `/proc/self/stat` + `/proc/self/status` (segment detail)
//! - **BSD/macOS/Solaris**: `/bin/ps -p<pid> -o rss,vsz`
//! - **POSIX fallback**: `getrusage(RUSAGE_SELF)` (`vsz` approximated by `rss`)
//! - **Windows**: `GetProcessMemoryInfo`
//!
//! The first probe that works is pinned once per process. If none works,
//! every metric reads 0 and `available()` is false.
//!
//! # Usage
//!
//! ```rust
//! use procmem::ProcessMemoryInfo;
//!
//! let mut pmi = ProcessMemoryInfo::new();
//! if pmi.available() {
//!     println!("Virtual size [Byte]: {}", pmi.vsz());
//!     println!("Resident size [Byte]: {}", pmi.rss());
//! }
//!
//! // Refresh in place
//! pmi.update();
//! ```
//!
//! To select probes with a custom [`ProbeConfig`], call [`chain::install`]
//! before the first `ProcessMemoryInfo` is created.

pub mod chain;
pub mod config;
pub mod error;
pub mod info;
pub mod probe;
pub mod sample;
pub mod threads;

// Re-export main types for convenience
pub use chain::{active_probe, install, pinned_kind, ProbeChain, SharedProbe};
pub use config::{load_config, validate_config, ProbeConfig};
pub use error::{ConfigError, ProbeError};
pub use info::{is_available, ProcessMemoryInfo};
pub use probe::{NullProbe, ProbeKind, ProbeStrategy};
pub use sample::{page_size, MetricsSample};
pub use threads::{current_threads, ThreadInfo};

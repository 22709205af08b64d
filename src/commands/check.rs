//! Check command implementation.
//!
//! Reports the selected probe and exits non-zero when nothing is available.

use anyhow::Result;

use super::human_bytes;
use procmem::{page_size, ProcessMemoryInfo};

/// Prints the outcome of one sample. Every line comes from `pmi`, so the
/// verdict and the printed sizes always describe the same sample.
fn report(pmi: &ProcessMemoryInfo) -> bool {
    println!("\n💾 Page size: {}", human_bytes(page_size()));
    println!("🔌 Active probe: {}", pmi.probe_kind());

    if !pmi.available() {
        println!("   ❌ No probe works on this platform - all metrics read 0");
        return false;
    }

    println!(
        "   ✅ Sampling works: RSS={}, VSZ={}",
        human_bytes(pmi.rss()),
        human_bytes(pmi.vsz())
    );
    if pmi.sample().segments_total() > 0 {
        println!("   ✅ Segment breakdown available");
    } else {
        println!("   ⚠️  No segment breakdown on this probe");
    }
    true
}

/// Prints probe availability; exits with code 1 if no probe works.
pub fn command_check() -> Result<()> {
    println!("🔍 Process Memory Probe - System Check");
    println!("======================================");

    if report(&ProcessMemoryInfo::new()) {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

//! Show command implementation.
//!
//! Prints the memory sample of this process, optionally repeated.

use anyhow::Result;
use std::thread;
use std::time::Duration;

use super::{human_bytes, render};
use crate::cli::OutputFormat;
use procmem::{page_size, ProcessMemoryInfo};

fn print_text(pmi: &ProcessMemoryInfo) {
    println!("📊 Process {} ({} probe)", pmi.pid(), pmi.probe_kind());
    if !pmi.available() {
        println!("   ❌ No memory metrics available on this platform");
        return;
    }
    println!("   ├─ Virtual size:  {}", human_bytes(pmi.vsz()));
    println!("   ├─ Resident size: {}", human_bytes(pmi.rss()));
    println!("   ├─ Page faults:   {}", pmi.pagefaults());
    println!("   ├─ Page size:     {}", human_bytes(page_size()));
    println!("   ├─ Data segment:  {}", human_bytes(pmi.data_segment()));
    println!("   ├─ Code segment:  {}", human_bytes(pmi.code_segment()));
    println!("   ├─ Shared libs:   {}", human_bytes(pmi.shared_segment()));
    println!("   └─ Stack segment: {}", human_bytes(pmi.stack_segment()));

    if !pmi.os_specific().is_empty() {
        println!("   Platform details:");
        for (label, value) in pmi.os_specific() {
            println!("      {:<28} {}", label, value);
        }
    }
}

/// Prints `count` samples, `interval_ms` apart.
pub fn command_show(format: OutputFormat, count: usize, interval_ms: u64) -> Result<()> {
    let mut pmi = ProcessMemoryInfo::new();

    for iteration in 1..=count.max(1) {
        if iteration > 1 {
            thread::sleep(Duration::from_millis(interval_ms));
            pmi.update();
        }
        match render(&pmi, format)? {
            Some(output) => println!("{output}"),
            None => print_text(&pmi),
        }
    }
    Ok(())
}

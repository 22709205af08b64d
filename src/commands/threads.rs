//! Threads command implementation.

use anyhow::{Context, Result};
use serde::Serialize;

use super::render;
use crate::cli::OutputFormat;
use procmem::{current_threads, ThreadInfo};

#[derive(Serialize)]
struct ThreadList {
    threads: Vec<ThreadInfo>,
}

/// Lists the threads of this process.
pub fn command_threads(format: OutputFormat) -> Result<()> {
    let threads = current_threads().context("Failed to enumerate threads")?;
    let list = ThreadList { threads };

    if let Some(output) = render(&list, format)? {
        println!("{output}");
        return Ok(());
    }

    println!("🧵 {} thread(s)", list.threads.len());
    for t in &list.threads {
        println!(
            "   ├─ {:>8}  {:<16} {}",
            t.ident,
            t.name,
            if t.daemon { "daemon" } else { "main" }
        );
    }
    Ok(())
}

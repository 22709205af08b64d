//! Enumeration of the threads of the current process.

use serde::Serialize;
use std::io;

/// One live thread of this process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadInfo {
    /// Kernel thread id.
    pub ident: u64,
    pub name: String,
    /// False only for the main thread; the process ends when it returns,
    /// whatever the other threads are doing.
    pub daemon: bool,
}

/// Lists the threads that exist at the time of the call.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn current_threads() -> io::Result<Vec<ThreadInfo>> {
    list_task_dir(std::path::Path::new("/proc/self/task"), std::process::id())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn current_threads() -> io::Result<Vec<ThreadInfo>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "thread enumeration requires /proc/self/task",
    ))
}

/// Reads `<task_dir>/<tid>/comm` for every numeric entry. Threads that exit
/// during the scan are skipped.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn list_task_dir(task_dir: &std::path::Path, pid: u32) -> io::Result<Vec<ThreadInfo>> {
    use std::fs;
    use tracing::debug;

    let mut threads = Vec::new();
    for entry in fs::read_dir(task_dir)? {
        let entry = entry?;
        let Some(tid) = entry.file_name().to_str().and_then(|s| s.parse::<u64>().ok()) else {
            continue;
        };

        let name = match fs::read_to_string(entry.path().join("comm")) {
            Ok(comm) => comm.trim_end_matches('\n').to_string(),
            Err(e) => {
                debug!("Thread {} vanished during scan: {}", tid, e);
                continue;
            }
        };

        threads.push(ThreadInfo {
            ident: tid,
            name: if name.is_empty() { tid.to_string() } else { name },
            daemon: tid != u64::from(pid),
        });
    }

    threads.sort_by_key(|t| t.ident);
    Ok(threads)
}

#[cfg(all(test, any(target_os = "linux", target_os = "android")))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_list_task_dir_synthetic() {
        let dir = tempdir().expect("Failed to create temp dir");
        for (tid, comm) in [("100", "main\n"), ("101", "worker-1\n"), ("102", "\n")] {
            fs::create_dir(dir.path().join(tid)).expect("Failed to create task dir");
            fs::write(dir.path().join(tid).join("comm"), comm).expect("Failed to write comm");
        }
        // Non-numeric entries and entries without comm are ignored
        fs::create_dir(dir.path().join("self")).expect("Failed to create dir");
        fs::create_dir(dir.path().join("103")).expect("Failed to create dir");

        let threads = list_task_dir(dir.path(), 100).expect("listing");
        assert_eq!(
            threads,
            vec![
                ThreadInfo {
                    ident: 100,
                    name: "main".into(),
                    daemon: false
                },
                ThreadInfo {
                    ident: 101,
                    name: "worker-1".into(),
                    daemon: true
                },
                ThreadInfo {
                    ident: 102,
                    name: "102".into(),
                    daemon: true
                },
            ]
        );
    }

    #[test]
    fn test_missing_task_dir_is_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(list_task_dir(&dir.path().join("absent"), 1).is_err());
    }
}

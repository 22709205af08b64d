//! Fallback probe running the system's `ps` for this pid.
//!
//! Works wherever a POSIX `ps` understands `-o rss,vsz` (macOS, the BSDs,
//! Solaris, Linux). Both columns are reported in kibibytes.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{ProbeKind, ProbeStrategy};
use crate::sample::MetricsSample;

/// Default location of the process-status tool.
pub const DEFAULT_PS_PATH: &str = "/bin/ps";

const TIMEOUT_POLL: Duration = Duration::from_millis(5);

/// Extracts `(rss_kb, vsz_kb)` from the last two whitespace-separated tokens.
/// Any header line before them is ignored.
pub fn parse_ps_output(stdout: &str) -> Option<(u64, u64)> {
    let tokens: Vec<&str> = stdout.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let rss = tokens[tokens.len() - 2].parse().ok()?;
    let vsz = tokens[tokens.len() - 1].parse().ok()?;
    Some((rss, vsz))
}

/// Runs an external command and reads resident/virtual sizes from it.
#[derive(Debug, Clone)]
pub struct ExternalToolProbe {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ExternalToolProbe {
    /// `ps -p<pid> -o rss,vsz` at `program`.
    pub fn ps(program: impl Into<PathBuf>, pid: u32) -> Self {
        Self::new(program, vec![format!("-p{}", pid), "-o".into(), "rss,vsz".into()])
    }

    /// Arbitrary command whose output ends in `<rss_kb> <vsz_kb>`.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Kill the command and fail the probe if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn run(&self) -> io::Result<Option<Output>> {
        let Some(timeout) = self.timeout else {
            return self.command().output().map(Some);
        };

        let mut child = self.command().spawn()?;
        // Drain both pipes while waiting so a chatty command cannot block on write.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                // Best effort: the child may have exited in between.
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            thread::sleep(TIMEOUT_POLL);
        };

        Ok(Some(Output {
            status,
            stdout: join_drain(stdout)?,
            stderr: join_drain(stderr)?,
        }))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_drain(handle: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| io::Error::other("pipe reader thread panicked"))?
}

impl ProbeStrategy for ExternalToolProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::ExternalTool
    }

    fn sample(&self, target: &mut MetricsSample) -> bool {
        let output = match self.run() {
            Ok(Some(output)) => output,
            Ok(None) => {
                warn!(
                    "{} did not finish within {:?}",
                    self.program.display(),
                    self.timeout.unwrap_or_default()
                );
                return false;
            }
            Err(e) => {
                debug!("Failed to launch {}: {}", self.program.display(), e);
                return false;
            }
        };

        if !output.status.success() {
            debug!("{} exited with {}", self.program.display(), output.status);
            return false;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_ps_output(&stdout) {
            Some((rss_kb, vsz_kb)) => {
                target.rss = rss_kb.saturating_mul(1024);
                target.vsz = vsz_kb.saturating_mul(1024);
                true
            }
            None => {
                debug!(
                    "Unusable output from {}: {:?}",
                    self.program.display(),
                    stdout.trim()
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> ExternalToolProbe {
        ExternalToolProbe::new("/bin/sh", vec!["-c".into(), script.into()])
    }

    #[test]
    fn test_parse_ps_output() {
        assert_eq!(parse_ps_output("  4096  8192\n"), Some((4096, 8192)));
        assert_eq!(parse_ps_output("  RSS    VSZ\n 1500 409600\n"), Some((1500, 409600)));
        assert_eq!(parse_ps_output("4096"), None);
        assert_eq!(parse_ps_output(""), None);
        assert_eq!(parse_ps_output("RSS VSZ\n"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_sample_from_command_output() {
        let probe = sh("printf '  4096  8192\\n'");
        let mut sample = MetricsSample::new(1);
        assert!(probe.sample(&mut sample));
        assert_eq!(sample.rss, 4096 * 1024);
        assert_eq!(sample.vsz, 8192 * 1024);
    }

    #[test]
    fn test_launch_failure_leaves_target_untouched() {
        let probe = ExternalToolProbe::ps("/nonexistent/bin/ps", 1);
        let mut sample = MetricsSample::new(1);
        assert!(!probe.sample(&mut sample));
        assert_eq!(sample, MetricsSample::new(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_fails() {
        let probe = sh("echo '4096 8192'; exit 3");
        let mut sample = MetricsSample::new(1);
        assert!(!probe.sample(&mut sample));
        assert!(sample.is_zeroed());
    }

    #[cfg(unix)]
    #[test]
    fn test_short_output_fails() {
        let probe = sh("echo 4096");
        let mut sample = MetricsSample::new(1);
        assert!(!probe.sample(&mut sample));
        assert!(sample.is_zeroed());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_hung_command() {
        let probe = sh("sleep 5; echo '1 2'").with_timeout(Some(Duration::from_millis(50)));
        let started = Instant::now();
        let mut sample = MetricsSample::new(1);
        assert!(!probe.sample(&mut sample));
        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(sample.is_zeroed());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_does_not_change_outcome_for_large_output() {
        // More than a pipe buffer of output before the sizes
        let script = "head -c 200000 /dev/zero | tr '\\0' x; echo; echo '10 20'";
        let plain = sh(script);
        let timed = sh(script).with_timeout(Some(Duration::from_secs(10)));

        let mut plain_sample = MetricsSample::new(1);
        let mut timed_sample = MetricsSample::new(1);
        let plain_ok = plain.sample(&mut plain_sample);
        let timed_ok = timed.sample(&mut timed_sample);

        assert!(plain_ok);
        assert_eq!(plain_ok, timed_ok);
        assert_eq!(timed_sample.rss, 10 * 1024);
        assert_eq!(timed_sample.vsz, 20 * 1024);
        assert_eq!(plain_sample, timed_sample);
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_allows_fast_command() {
        let probe = sh("echo '10 20'").with_timeout(Some(Duration::from_secs(5)));
        let mut sample = MetricsSample::new(1);
        assert!(probe.sample(&mut sample));
        assert_eq!(sample.rss, 10 * 1024);
        assert_eq!(sample.vsz, 20 * 1024);
    }
}

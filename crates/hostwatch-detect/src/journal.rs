use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::{JOURNAL_PROBE_TIMEOUT, JOURNAL_QUERY_TIMEOUT};
use crate::error::ScanError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Time-boxed access to the system journal through `journalctl`
#[derive(Clone, Debug)]
pub struct JournalQuery {
    program: String,
    probe_timeout: Duration,
    query_timeout: Duration,
}

impl JournalQuery {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            probe_timeout: JOURNAL_PROBE_TIMEOUT,
            query_timeout: JOURNAL_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, probe: Duration, query: Duration) -> Self {
        self.probe_timeout = probe;
        self.query_timeout = query;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Cheap check that the journal can be listed
    pub fn probe(&self) -> Result<(), ScanError> {
        self.run(&["--list-boots", "-q"], self.probe_timeout)
            .map(|_| ())
    }

    /// The `count` most recent journal lines, without pager or decorations
    pub fn recent(&self, count: usize) -> Result<String, ScanError> {
        let count = count.to_string();
        self.run(&["-n", &count, "--no-pager", "-q"], self.query_timeout)
    }

    fn run(&self, args: &[&str], timeout: Duration) -> Result<String, ScanError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ScanError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Drain stdout on a separate thread so a full pipe cannot stall the child
        let stdout = child.stdout.take();
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout {
                let _ = out.read_to_end(&mut buf);
            }
            buf
        });

        let status = self.wait_with_deadline(&mut child, timeout)?;
        let bytes = reader.join().unwrap_or_default();

        if !status.success() {
            return Err(ScanError::ExitStatus {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }

        debug!(program = %self.program, ?args, bytes = bytes.len(), "journal query finished");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn wait_with_deadline(
        &self,
        child: &mut std::process::Child,
        timeout: Duration,
    ) -> Result<ExitStatus, ScanError> {
        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ScanError::Timeout {
                        program: self.program.clone(),
                        timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    return Err(ScanError::Spawn {
                        program: self.program.clone(),
                        source,
                    });
                }
            }
        }
    }
}

impl Default for JournalQuery {
    fn default() -> Self {
        Self::new("journalctl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_succeeds_on_zero_exit() {
        assert!(JournalQuery::new("true").probe().is_ok());
    }

    #[test]
    fn test_probe_fails_on_nonzero_exit() {
        let err = JournalQuery::new("false").probe().unwrap_err();
        assert!(matches!(err, ScanError::ExitStatus { .. }));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = JournalQuery::new("/nonexistent/journalctl")
            .probe()
            .unwrap_err();
        assert!(matches!(err, ScanError::Spawn { .. }));
    }

    #[test]
    fn test_slow_command_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-journal");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 5\n").unwrap();
        make_executable(&script);

        let query = JournalQuery::new(script.to_string_lossy())
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        let started = Instant::now();
        let err = query.recent(10).unwrap_err();
        assert!(matches!(err, ScanError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    fn make_executable(path: &std::path::Path) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

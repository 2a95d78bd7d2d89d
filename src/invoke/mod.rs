//! External analyzer invocation.
//!
//! The analyzer writes its report to stdout; the invoker owns redirection
//! into a scoped temp directory, so captured reports never outlive the run.
//! The wait loop enforces the configured timeout and honors host-driven
//! cancellation; both kill the in-flight process.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use crate::error::{BridgeError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cooperative cancellation handle shared with the host.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one tool invocation.
///
/// Holds the temp directory containing the captured report; dropping the
/// value removes the directory on every exit path, including parse failures.
#[derive(Debug)]
pub struct ToolRun {
    /// Exit code, `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured stdout — the report artifact.
    pub report_path: PathBuf,
    /// Captured stderr, for diagnostics.
    pub stderr: String,
    _dir: TempDir,
}

#[derive(Debug, Clone)]
pub struct ToolInvoker {
    executable: PathBuf,
    working_dir: PathBuf,
    timeout: Duration,
}

impl ToolInvoker {
    pub fn new(executable: PathBuf, working_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            executable,
            working_dir,
            timeout,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Launch the tool and wait for it under the configured timeout.
    ///
    /// A non-zero exit code is not an error here — analyzers commonly exit
    /// non-zero when they find issues; the caller decides based on the
    /// report.
    pub fn run(&self, args: &[String], cancel: &CancelToken) -> Result<ToolRun> {
        if !self.executable.is_file() {
            return Err(BridgeError::ToolNotFound(self.executable.clone()));
        }

        let dir = tempfile::tempdir()?;
        let report_path = dir.path().join("report.xml");
        let stderr_path = dir.path().join("stderr.log");
        let stdout_file = File::create(&report_path)?;
        let stderr_file = File::create(&stderr_path)?;

        tracing::debug!(
            tool = %self.executable.display(),
            args = ?args,
            timeout_secs = self.timeout.as_secs(),
            "launching analyzer"
        );

        let mut child = Command::new(&self.executable)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file))
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BridgeError::ToolNotFound(self.executable.clone())
                } else {
                    BridgeError::Io(e)
                }
            })?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BridgeError::Cancelled);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BridgeError::ToolTimeout {
                    timeout: self.timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        let stderr = std::fs::read_to_string(&stderr_path).unwrap_or_default();

        Ok(ToolRun {
            exit_code: status.code(),
            report_path,
            stderr,
            _dir: dir,
        })
    }
}

//! Bounded external-process invocation.
//!
//! Every helper call gets its own deadline; a hung helper is killed and the
//! call reported as [`DdcError::Timeout`]. Nothing is retried here.

use crate::error::{DdcError, Result};
use log::debug;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Minimum wait for the pipes to close once the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(50);

/// Runs helper binaries and resolves them on the executable search path.
pub trait CommandRunner {
    /// Run `program args...`, returning its stdout when it exits successfully
    /// within `timeout`.
    fn output(&self, program: &str, args: &[String], timeout: Duration) -> Result<String>;

    /// Resolve `program` on the search path.
    fn lookup(&self, program: &str) -> Option<PathBuf>;
}

/// The real runner: spawns processes on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, program: &str, args: &[String], timeout: Duration) -> Result<String> {
        debug!("exec: {} {}", program, args.join(" "));
        let deadline = Instant::now() + timeout;
        let timed_out = || DdcError::Timeout {
            program: program.to_string(),
            timeout,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DdcError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Drain both pipes off-thread so a chatty helper cannot block on a
        // full pipe while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match wait_deadline(&mut child, deadline) {
            Ok(Some(status)) => status,
            Ok(None) => {
                reap(&mut child);
                return Err(timed_out());
            }
            Err(e) => {
                reap(&mut child);
                return Err(e);
            }
        };

        // A grandchild that inherited the pipes keeps them open after the
        // helper itself has exited.
        let stdout = collect(&stdout, deadline).ok_or_else(timed_out)?;
        let stderr = collect(&stderr, deadline).ok_or_else(timed_out)?;

        if !status.success() {
            return Err(DdcError::CommandFailed {
                program: program.to_string(),
                status: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn lookup(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

/// Everything a drain thread read, or `None` if the pipe is still open at
/// the deadline.
fn collect(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Option<Vec<u8>> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    rx.recv_timeout(remaining.max(DRAIN_GRACE)).ok()
}

/// Wait for `child` to exit. `Ok(None)` means the deadline passed first.
fn wait_deadline(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
#[path = "tests/runner_tests.rs"]
mod tests;

//! The external symbolizer session.
//!
//! One lazily started subprocess answers one address per request over its
//! standard streams. The session owns the child exclusively: spawned on the
//! first request, killed exactly once at shutdown (or drop), and abandoned
//! rather than restarted after a timeout, a broken pipe, or a failed spawn,
//! so a stalled symbolizer costs unresolved frames rather than a hung run.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, warn};

use crate::domain::SymbolizerError;

/// Manages the long-lived symbolizer subprocess.
///
/// Request protocol: write the address line followed by a blank line; read
/// exactly one line back as the resolved name; read and discard the blank
/// terminator the subprocess emits after each answer. One request is in
/// flight at a time.
pub struct SymbolizerSession {
    command: String,
    target: PathBuf,
    timeout: Duration,
    proc: Option<SessionProc>,
    unavailable: bool,
}

struct SessionProc {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<std::io::Result<String>>,
}

impl SymbolizerSession {
    #[must_use]
    pub fn new(command: String, target: PathBuf, timeout: Duration) -> Self {
        Self { command, target, timeout, proc: None, unavailable: false }
    }

    /// Resolve one address, starting the subprocess if this is the first
    /// request. `None` means the session cannot resolve it: an address the
    /// symbolizer does not answer in time, or a subprocess that died or
    /// never started.
    pub fn symbolize(&mut self, address: &str) -> Option<String> {
        if self.unavailable {
            return None;
        }
        if self.proc.is_none() {
            match self.start() {
                Ok(proc) => self.proc = Some(proc),
                Err(e) => {
                    warn!("symbolizer unavailable for the rest of the run: {e}");
                    self.unavailable = true;
                    return None;
                }
            }
        }

        let timeout = self.timeout;
        let proc = self.proc.as_mut()?;
        match Self::exchange(proc, timeout, address) {
            Ok(name) => Some(name),
            Err(e) => {
                warn!("symbolizer abandoned after error: {e}");
                self.abandon();
                None
            }
        }
    }

    /// Terminate the subprocess. Safe to call when it was never started, and
    /// more than once.
    pub fn shutdown(&mut self) {
        if self.proc.is_some() {
            debug!("shutting down symbolizer");
        }
        self.kill_child();
    }

    fn start(&self) -> Result<SessionProc, SymbolizerError> {
        let spawn_failed = |reason: String| SymbolizerError::SpawnFailed {
            command: self.command.clone(),
            reason,
        };

        let mut child = Command::new(&self.command)
            .arg(format!("--obj={}", self.target.display()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_failed(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_failed("failed to capture stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failed("failed to capture stdout".to_string()))?;

        // Reading happens on a detached thread so every request can be
        // bounded by the timeout; the thread exits when stdout closes or the
        // receiver is dropped. Never joined: a killed child can leave
        // grandchildren holding the pipe open.
        let (tx, rx) = crossbeam_channel::unbounded();
        std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        debug!("started symbolizer: {} --obj={}", self.command, self.target.display());
        Ok(SessionProc { child, stdin, lines: rx })
    }

    fn exchange(
        proc: &mut SessionProc,
        timeout: Duration,
        address: &str,
    ) -> Result<String, SymbolizerError> {
        writeln!(proc.stdin, "{address}")?;
        writeln!(proc.stdin)?;
        proc.stdin.flush()?;

        let name = Self::next_line(proc, timeout)?;
        // The subprocess terminates every answer with a blank line.
        let terminator = Self::next_line(proc, timeout)?;
        if !terminator.trim().is_empty() {
            debug!("expected blank terminator, got {terminator:?}");
        }
        Ok(name)
    }

    fn next_line(proc: &SessionProc, timeout: Duration) -> Result<String, SymbolizerError> {
        match proc.lines.recv_timeout(timeout) {
            Ok(Ok(line)) => Ok(line),
            Ok(Err(e)) => Err(SymbolizerError::Io(e)),
            Err(RecvTimeoutError::Timeout) => Err(SymbolizerError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            Err(RecvTimeoutError::Disconnected) => {
                Err(SymbolizerError::Crashed("stdout closed".to_string()))
            }
        }
    }

    /// Kill the child and mark native resolution unavailable for the rest of
    /// the run.
    fn abandon(&mut self) {
        self.unavailable = true;
        self.kill_child();
    }

    fn kill_child(&mut self) {
        if let Some(proc) = self.proc.take() {
            let SessionProc { mut child, stdin, lines } = proc;
            drop(stdin);
            drop(lines);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for SymbolizerSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

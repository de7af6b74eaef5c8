//! Supervisor for long-running child processes (dev servers, watchers).
//!
//! Processes are tracked in an arena keyed by PID. The arena lock is only
//! held long enough to clone an entry handle; each entry carries its own
//! output lock shared with its two stream readers, so readers of one process
//! never wait on another.
//!
//! Lifecycle: `Starting -> Running -> (Exited | Stopped)`. The child handle is
//! owned by a single waiter task that reaps it and publishes the exit code on
//! a watch channel; everything else observes the process through that
//! channel and signals it by process group.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use tokio::io::{AsyncRead, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::output_buffer::{MAX_LINE_BYTES, OutputBuffer};
use crate::process_group::{self, KillSignal};
use crate::shell::shell_command;
use crate::stream::{ReadLineResult, decode_line, read_line_with_limit};

/// Upper bound on how long `run_background` blocks for startup output.
pub const MAX_STARTUP_WAIT: Duration = Duration::from_secs(30);
/// Grace window between SIGTERM and SIGKILL.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(5);
/// Final wait for the reaper after SIGKILL.
const REAP_WAIT: Duration = Duration::from_secs(2);
/// Lines returned by `check` and in startup reports.
pub const REPORT_TAIL_LINES: usize = 50;
/// Time given to readers to flush the last lines of an exited process.
const READER_FLUSH_WAIT: Duration = Duration::from_secs(1);
const STDERR_TAG: &str = "[stderr] ";

#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("process {pid} is not tracked")]
    NotTracked { pid: u32 },
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Starting,
    Running,
    Exited { code: Option<i32> },
    Stopped { forced: bool },
}

impl ProcessState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exited { .. } | Self::Stopped { .. })
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => f.write_str("STARTING"),
            Self::Running => f.write_str("RUNNING"),
            Self::Exited { code: Some(code) } => write!(f, "EXITED (code {code})"),
            Self::Exited { code: None } => f.write_str("EXITED"),
            Self::Stopped { forced: false } => f.write_str("STOPPED"),
            Self::Stopped { forced: true } => f.write_str("STOPPED (killed)"),
        }
    }
}

/// Result of `run_background`.
#[derive(Debug, Clone)]
pub struct StartReport {
    pub pid: u32,
    pub command: String,
    pub state: ProcessState,
    /// The process was already gone when the startup wait ended.
    pub crashed_on_startup: bool,
    pub output: Vec<String>,
}

/// Result of `check`.
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub pid: u32,
    pub command: String,
    pub state: ProcessState,
    pub uptime: Duration,
    pub started_at: DateTime<Local>,
    pub output: Vec<String>,
    pub dropped_lines: usize,
}

/// One row of `list`.
#[derive(Debug, Clone)]
pub struct ProcessSummary {
    pub pid: u32,
    pub command: String,
    pub state: ProcessState,
    pub uptime: Duration,
    pub buffered_lines: usize,
}

/// Outcome of `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Exited within the grace window after SIGTERM.
    Terminated,
    /// Needed SIGKILL.
    Killed,
    /// Had already exited before the stop request.
    AlreadyExited { code: Option<i32> },
}

struct TrackedProcess {
    pid: u32,
    command: String,
    started: Instant,
    started_at: DateTime<Local>,
    output: Arc<Mutex<OutputBuffer>>,
    state: Mutex<ProcessState>,
    exit_rx: watch::Receiver<Option<Option<i32>>>,
    readers: Mutex<Vec<JoinHandle<()>>>,
}

impl TrackedProcess {
    /// Current state, folding in an exit the waiter has published.
    fn refresh_state(&self) -> ProcessState {
        let mut state = self.state.lock();
        if !state.is_terminal()
            && let Some(code) = *self.exit_rx.borrow()
        {
            *state = ProcessState::Exited { code };
        }
        *state
    }

    fn exit_code(&self) -> Option<Option<i32>> {
        *self.exit_rx.borrow()
    }

    async fn wait_exit(&self, limit: Duration) -> bool {
        let mut rx = self.exit_rx.clone();
        // a closed channel means the waiter is gone, which only happens after exit
        tokio::time::timeout(limit, rx.wait_for(Option::is_some))
            .await
            .is_ok()
    }

    async fn flush_readers(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.readers.lock());
        for handle in handles {
            let abort = handle.abort_handle();
            if tokio::time::timeout(READER_FLUSH_WAIT, handle).await.is_err() {
                abort.abort();
            }
        }
    }

    fn abort_readers(&self) {
        for handle in self.readers.lock().drain(..) {
            handle.abort();
        }
    }

    fn tail(&self, count: usize) -> (Vec<String>, usize) {
        let output = self.output.lock();
        (output.tail(count), output.dropped())
    }
}

/// Tracks background processes launched for one session.
pub struct BackgroundSupervisor {
    working_dir: PathBuf,
    processes: RwLock<HashMap<u32, Arc<TrackedProcess>>>,
}

impl BackgroundSupervisor {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            processes: RwLock::new(HashMap::new()),
        }
    }

    /// Launch `command`, wait up to `wait` (capped at [`MAX_STARTUP_WAIT`])
    /// for startup output, and track it if it is still alive.
    pub async fn start(&self, command: &str, wait: Duration) -> Result<StartReport, BackgroundError> {
        let wait = wait.min(MAX_STARTUP_WAIT);
        let process = self.spawn(command)?;
        info!(pid = process.pid, command, "started background process");
        // tracked before the wait so an abandoned start is still reached by shutdown
        self.processes
            .write()
            .insert(process.pid, Arc::clone(&process));

        let exited = process.wait_exit(wait).await;
        if exited {
            self.processes.write().remove(&process.pid);
            process.flush_readers().await;
            let state = process.refresh_state();
            let (output, _) = process.tail(REPORT_TAIL_LINES);
            warn!(pid = process.pid, %state, "background process exited during startup");
            return Ok(StartReport {
                pid: process.pid,
                command: process.command.clone(),
                state,
                crashed_on_startup: true,
                output,
            });
        }

        *process.state.lock() = ProcessState::Running;
        let (output, _) = process.tail(REPORT_TAIL_LINES);
        let report = StartReport {
            pid: process.pid,
            command: process.command.clone(),
            state: ProcessState::Running,
            crashed_on_startup: false,
            output,
        };
        Ok(report)
    }

    /// Liveness, uptime and recent output. An exited process is reported one
    /// last time and then forgotten.
    pub fn check(&self, pid: u32) -> Result<ProcessReport, BackgroundError> {
        let process = self.get(pid)?;
        let state = process.refresh_state();
        let (output, dropped_lines) = process.tail(REPORT_TAIL_LINES);

        if state.is_terminal() {
            debug!(pid, %state, "removing exited background process");
            self.processes.write().remove(&pid);
            process.abort_readers();
        }

        Ok(ProcessReport {
            pid,
            command: process.command.clone(),
            state,
            uptime: process.started.elapsed(),
            started_at: process.started_at,
            output,
            dropped_lines,
        })
    }

    /// SIGTERM the process group, escalate to SIGKILL after
    /// [`STOP_GRACE_PERIOD`], and stop tracking the process.
    pub async fn stop(&self, pid: u32) -> Result<StopOutcome, BackgroundError> {
        let process = self.get(pid)?;

        if let Some(code) = process.exit_code() {
            self.processes.write().remove(&pid);
            process.refresh_state();
            process.abort_readers();
            return Ok(StopOutcome::AlreadyExited { code });
        }

        if let Err(err) = process_group::signal_process_group(pid, KillSignal::Term) {
            warn!(pid, error = %err, "failed to send SIGTERM");
        }

        let outcome = if process.wait_exit(STOP_GRACE_PERIOD).await {
            StopOutcome::Terminated
        } else {
            warn!(pid, "process ignored SIGTERM; sending SIGKILL");
            if let Err(err) = process_group::signal_process_group(pid, KillSignal::Kill) {
                warn!(pid, error = %err, "failed to send SIGKILL");
            }
            if !process.wait_exit(REAP_WAIT).await {
                warn!(pid, "process not reaped after SIGKILL");
            }
            StopOutcome::Killed
        };

        *process.state.lock() = ProcessState::Stopped {
            forced: outcome == StopOutcome::Killed,
        };
        self.processes.write().remove(&pid);
        process.flush_readers().await;
        info!(pid, ?outcome, "stopped background process");
        Ok(outcome)
    }

    /// Snapshot every tracked process.
    pub fn list(&self) -> Vec<ProcessSummary> {
        let processes: Vec<Arc<TrackedProcess>> =
            self.processes.read().values().cloned().collect();

        let mut summaries: Vec<ProcessSummary> = processes
            .iter()
            .map(|process| ProcessSummary {
                pid: process.pid,
                command: process.command.clone(),
                state: process.refresh_state(),
                uptime: process.started.elapsed(),
                buffered_lines: process.output.lock().len(),
            })
            .collect();
        summaries.sort_by_key(|summary| summary.pid);
        summaries
    }

    pub fn tracked_pids(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = self.processes.read().keys().copied().collect();
        pids.sort_unstable();
        pids
    }

    /// Stop everything still tracked. Used at session teardown.
    pub async fn shutdown(&self) {
        for pid in self.tracked_pids() {
            if let Err(err) = self.stop(pid).await {
                debug!(pid, error = %err, "background process vanished during shutdown");
            }
        }
    }

    fn get(&self, pid: u32) -> Result<Arc<TrackedProcess>, BackgroundError> {
        self.processes
            .read()
            .get(&pid)
            .cloned()
            .ok_or(BackgroundError::NotTracked { pid })
    }

    fn spawn(&self, command: &str) -> Result<Arc<TrackedProcess>, BackgroundError> {
        let mut cmd = shell_command(command, &self.working_dir);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        process_group::isolate_command(&mut cmd);

        let spawn_error = |source| BackgroundError::Spawn {
            command: command.to_owned(),
            source,
        };
        let mut child = cmd.spawn().map_err(spawn_error)?;
        let pid = child
            .id()
            .ok_or_else(|| spawn_error(std::io::Error::other("child exited before reporting a pid")))?;

        let output = Arc::new(Mutex::new(OutputBuffer::default()));
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump_lines(stdout, Arc::clone(&output), None)));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump_lines(
                stderr,
                Arc::clone(&output),
                Some(STDERR_TAG),
            )));
        }

        let (exit_tx, exit_rx) = watch::channel(None);
        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => process_group::exit_code_of(status),
                Err(err) => {
                    warn!(pid, error = %err, "failed to wait on background process");
                    None
                }
            };
            debug!(pid, ?code, "background process exited");
            exit_tx.send_replace(Some(code));
        });

        Ok(Arc::new(TrackedProcess {
            pid,
            command: command.to_owned(),
            started: Instant::now(),
            started_at: Local::now(),
            output,
            state: Mutex::new(ProcessState::Starting),
            exit_rx,
            readers: Mutex::new(readers),
        }))
    }
}

/// Append lines from one stream until it closes.
async fn pump_lines<R>(stream: R, output: Arc<Mutex<OutputBuffer>>, tag: Option<&'static str>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        match read_line_with_limit(&mut reader, &mut buf, MAX_LINE_BYTES).await {
            Ok(ReadLineResult::Eof) => break,
            Ok(ReadLineResult::Line(bytes) | ReadLineResult::Truncated(bytes)) => {
                let line = decode_line(&bytes);
                let line = match tag {
                    Some(tag) => format!("{tag}{line}"),
                    None => line,
                };
                output.lock().push(line);
            }
            Err(ref err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => {
                debug!(error = %err, "background stream closed with error");
                break;
            }
        }
    }
}

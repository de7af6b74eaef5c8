//! One-shot shell commands with a hard timeout.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::process_group::{self, KillSignal};
use crate::stream::{HeadTailCapture, drain_into};

/// Default wall-clock limit for `run_command`.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
/// Rendered output above this many chars is cut down to head and tail.
pub const DEFAULT_OUTPUT_LIMIT_CHARS: usize = 10_000;
/// Bytes of each stream kept in memory from the start and from the end.
const CAPTURE_HALF_BYTES: usize = 256 * 1024;
/// How long to keep reading pipes after the shell exits (grandchildren may
/// still hold them open).
const READER_DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("command timed out ({seconds}s limit)")]
    Timeout { seconds: u64 },
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to wait for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Merge the streams the way the model sees them: stdout, then stderr,
    /// then a non-zero exit code, capped to `limit` chars.
    pub fn render(&self, limit: usize) -> String {
        let mut text = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&self.stderr);
        }
        match self.exit_code {
            Some(0) => {}
            Some(code) => text.push_str(&format!("\n(exit code: {code})")),
            None => text.push_str("\n(exit code: unknown)"),
        }
        if text.is_empty() {
            return "(no output)".to_owned();
        }
        cap_head_tail(&text, limit)
    }
}

/// Keep the first and last `limit / 2` chars of `text` with an omission
/// marker between them.
pub fn cap_head_tail(text: &str, limit: usize) -> String {
    let total = text.chars().count();
    if total <= limit {
        return text.to_owned();
    }

    let half = limit / 2;
    let head: String = text.chars().take(half).collect();
    let tail: String = text.chars().skip(total - half).collect();
    format!("{head}\n... ({} chars omitted) ...\n{tail}", total - 2 * half)
}

/// Runs commands through `sh -c` inside a fixed working directory.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    working_dir: PathBuf,
    timeout: Duration,
}

impl ShellExecutor {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        let mut cmd = shell_command(command, &self.working_dir);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        process_group::isolate_command(&mut cmd);

        let mut child = cmd.spawn().map_err(|source| ShellError::Spawn {
            command: command.to_owned(),
            source,
        })?;
        let pid = child.id();
        debug!(?pid, command, "spawned shell command");

        let stdout = Arc::new(Mutex::new(HeadTailCapture::new(CAPTURE_HALF_BYTES)));
        let stderr = Arc::new(Mutex::new(HeadTailCapture::new(CAPTURE_HALF_BYTES)));
        let mut readers: Vec<JoinHandle<()>> = Vec::with_capacity(2);
        if let Some(pipe) = child.stdout.take() {
            readers.push(spawn_drain(pipe, Arc::clone(&stdout)));
        }
        if let Some(pipe) = child.stderr.take() {
            readers.push(spawn_drain(pipe, Arc::clone(&stderr)));
        }

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(source)) => {
                abort_all(&readers);
                return Err(ShellError::Wait {
                    command: command.to_owned(),
                    source,
                });
            }
            Err(_) => {
                warn!(?pid, command, "command timed out; killing process group");
                if let Some(pid) = pid
                    && let Err(err) = process_group::signal_process_group(pid, KillSignal::Kill)
                {
                    warn!(pid, error = %err, "failed to kill timed out process group");
                }
                let _ = child.kill().await;
                abort_all(&readers);
                return Err(ShellError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        for reader in readers {
            let abort = reader.abort_handle();
            if tokio::time::timeout(READER_DRAIN_GRACE, reader).await.is_err() {
                debug!(command, "output pipe still open after exit; detaching reader");
                abort.abort();
            }
        }

        Ok(CommandOutput {
            stdout: take_capture(&stdout),
            stderr: take_capture(&stderr),
            exit_code: process_group::exit_code_of(status),
        })
    }
}

pub(crate) fn shell_command(command: &str, working_dir: &Path) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command).current_dir(working_dir);
    cmd
}

fn spawn_drain<R>(pipe: R, capture: Arc<Mutex<HeadTailCapture>>) -> JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = drain_into(pipe, &capture).await {
            debug!(error = %err, "stopped reading command output");
        }
    })
}

fn abort_all(readers: &[JoinHandle<()>]) {
    for reader in readers {
        reader.abort();
    }
}

fn take_capture(capture: &Mutex<HeadTailCapture>) -> String {
    let taken = std::mem::replace(&mut *capture.lock(), HeadTailCapture::new(0));
    taken.into_string()
}

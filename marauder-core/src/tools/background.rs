//! Text rendering for the background process tools.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use marauder_bash_runner::{
    BackgroundError, BackgroundSupervisor, ProcessReport, StartReport, StopOutcome,
};

use super::error::ToolError;

/// `run_background`, `check_background`, `stop_background` and
/// `list_background` over one session's supervisor.
#[derive(Clone)]
pub struct BackgroundTools {
    supervisor: Arc<BackgroundSupervisor>,
}

impl BackgroundTools {
    pub fn new(working_dir: &Path) -> Self {
        Self {
            supervisor: Arc::new(BackgroundSupervisor::new(working_dir)),
        }
    }

    pub fn supervisor(&self) -> &Arc<BackgroundSupervisor> {
        &self.supervisor
    }

    pub async fn run(&self, command: &str, wait_seconds: f64) -> Result<String, ToolError> {
        let wait = Duration::try_from_secs_f64(wait_seconds.max(0.0)).unwrap_or(Duration::ZERO);
        let report = self
            .supervisor
            .start(command, wait)
            .await
            .map_err(map_error)?;
        Ok(render_start(&report))
    }

    pub fn check(&self, pid: u32) -> Result<String, ToolError> {
        let report = self.supervisor.check(pid).map_err(map_error)?;
        Ok(render_check(&report))
    }

    pub async fn stop(&self, pid: u32) -> Result<String, ToolError> {
        let outcome = self.supervisor.stop(pid).await.map_err(map_error)?;
        Ok(render_stop(pid, outcome))
    }

    pub fn list(&self) -> String {
        let summaries = self.supervisor.list();
        if summaries.is_empty() {
            return "No background processes running.".to_owned();
        }

        let mut text = format!("{} background process(es):", summaries.len());
        for summary in summaries {
            let _ = write!(
                text,
                "\n  PID {} [{}] up {} ({} lines buffered): {}",
                summary.pid,
                summary.state,
                format_uptime(summary.uptime),
                summary.buffered_lines,
                summary.command
            );
        }
        text
    }

    pub async fn shutdown(&self) {
        self.supervisor.shutdown().await;
    }
}

fn map_error(err: BackgroundError) -> ToolError {
    match err {
        BackgroundError::NotTracked { pid } => ToolError::ProcessNotTracked { pid },
        BackgroundError::Spawn { command, source } => {
            ToolError::io(format!("failed to start `{command}`"), source)
        }
    }
}

fn push_output(text: &mut String, output: &[String]) {
    if output.is_empty() {
        text.push_str("(no output yet)");
    } else {
        text.push_str(&output.join("\n"));
    }
}

fn render_start(report: &StartReport) -> String {
    let mut text = if report.crashed_on_startup {
        format!(
            "Process crashed on startup (PID {}, {}): {}\nOutput:\n",
            report.pid, report.state, report.command
        )
    } else {
        format!(
            "Started background process (PID {}): {}\nStatus: {}\nStartup output:\n",
            report.pid, report.command, report.state
        )
    };
    push_output(&mut text, &report.output);
    text
}

fn render_check(report: &ProcessReport) -> String {
    let mut text = format!(
        "PID {}: {}\nStatus: {}\nUptime: {} (started {})\n",
        report.pid,
        report.command,
        report.state,
        format_uptime(report.uptime),
        report.started_at.format("%H:%M:%S")
    );
    if report.dropped_lines > 0 {
        let _ = writeln!(text, "({} older lines dropped)", report.dropped_lines);
    }
    let _ = writeln!(text, "Recent output ({} lines):", report.output.len());
    push_output(&mut text, &report.output);
    if report.state.is_terminal() {
        text.push_str("\nProcess is no longer running and is no longer tracked.");
    }
    text
}

fn render_stop(pid: u32, outcome: StopOutcome) -> String {
    match outcome {
        StopOutcome::Terminated => format!("Stopped process {pid} (SIGTERM)."),
        StopOutcome::Killed => format!("Killed process {pid} (did not exit after SIGTERM)."),
        StopOutcome::AlreadyExited { code: Some(code) } => {
            format!("Process {pid} had already exited (code {code}).")
        }
        StopOutcome::AlreadyExited { code: None } => format!("Process {pid} had already exited."),
    }
}

/// `1h 02m 03s`, `4m 05s`, or `12s`.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use marauder_bash_runner::ProcessState;
    use pretty_assertions::assert_eq;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(12)), "12s");
        assert_eq!(format_uptime(Duration::from_secs(245)), "4m 05s");
        assert_eq!(format_uptime(Duration::from_secs(3723)), "1h 02m 03s");
    }

    #[test]
    fn crashed_start_is_flagged() {
        let report = StartReport {
            pid: 41,
            command: "python app.py".into(),
            state: ProcessState::Exited { code: Some(1) },
            crashed_on_startup: true,
            output: vec!["[stderr] ImportError: no module".into()],
        };
        assert_eq!(
            render_start(&report),
            "Process crashed on startup (PID 41, EXITED (code 1)): python app.py\nOutput:\n[stderr] ImportError: no module"
        );
    }

    #[test]
    fn exited_check_mentions_tracking() {
        let report = ProcessReport {
            pid: 7,
            command: "make watch".into(),
            state: ProcessState::Exited { code: Some(0) },
            uptime: Duration::from_secs(3),
            started_at: Local::now(),
            output: Vec::new(),
            dropped_lines: 12,
        };
        let text = render_check(&report);
        assert!(text.starts_with("PID 7: make watch\nStatus: EXITED (code 0)\nUptime: 3s"));
        assert!(text.contains("(12 older lines dropped)"));
        assert!(text.contains("Recent output (0 lines):\n(no output yet)"));
        assert!(text.ends_with("no longer tracked."));
    }

    #[test]
    fn stop_outcomes() {
        assert_eq!(render_stop(3, StopOutcome::Terminated), "Stopped process 3 (SIGTERM).");
        assert_eq!(
            render_stop(3, StopOutcome::AlreadyExited { code: Some(2) }),
            "Process 3 had already exited (code 2)."
        );
    }
}

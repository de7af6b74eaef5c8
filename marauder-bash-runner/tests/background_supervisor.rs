#![cfg(unix)]

use std::time::Duration;

use assert_fs::TempDir;
use marauder_bash_runner::{
    BackgroundError, BackgroundSupervisor, OUTPUT_BUFFER_HARD_CAP, OUTPUT_BUFFER_RETAIN,
    ProcessState, STOP_GRACE_PERIOD, ShellError, ShellExecutor, StopOutcome,
};
use pretty_assertions::assert_eq;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn long_running_process_lifecycle() -> TestResult {
    let dir = TempDir::new()?;
    let supervisor = BackgroundSupervisor::new(dir.path());

    let started = supervisor
        .start("echo ready; sleep 100", Duration::from_millis(500))
        .await?;
    assert!(!started.crashed_on_startup);
    assert_eq!(started.state, ProcessState::Running);
    assert_eq!(started.output, vec!["ready".to_owned()]);
    assert_eq!(supervisor.tracked_pids(), vec![started.pid]);

    let report = supervisor.check(started.pid)?;
    assert_eq!(report.state, ProcessState::Running);
    assert_eq!(report.command, "echo ready; sleep 100");

    let outcome = supervisor.stop(started.pid).await?;
    assert_eq!(outcome, StopOutcome::Terminated);
    assert!(matches!(
        supervisor.check(started.pid),
        Err(BackgroundError::NotTracked { .. })
    ));
    assert!(supervisor.list().is_empty());
    Ok(())
}

#[tokio::test]
async fn crash_during_startup_is_reported_and_not_tracked() -> TestResult {
    let dir = TempDir::new()?;
    let supervisor = BackgroundSupervisor::new(dir.path());

    let started = supervisor
        .start("echo boom; exit 3", Duration::from_secs(5))
        .await?;
    assert!(started.crashed_on_startup);
    assert_eq!(started.state, ProcessState::Exited { code: Some(3) });
    assert_eq!(started.output, vec!["boom".to_owned()]);
    assert!(supervisor.tracked_pids().is_empty());
    Ok(())
}

#[tokio::test]
async fn stderr_lines_are_tagged() -> TestResult {
    let dir = TempDir::new()?;
    let supervisor = BackgroundSupervisor::new(dir.path());

    let started = supervisor
        .start("echo oops >&2; sleep 100", Duration::from_millis(500))
        .await?;
    assert_eq!(started.output, vec!["[stderr] oops".to_owned()]);
    supervisor.shutdown().await;
    assert!(supervisor.tracked_pids().is_empty());
    Ok(())
}

#[tokio::test]
async fn exited_process_is_reported_once_then_forgotten() -> TestResult {
    let dir = TempDir::new()?;
    let supervisor = BackgroundSupervisor::new(dir.path());

    let started = supervisor
        .start("sleep 1; echo done", Duration::from_millis(200))
        .await?;
    assert_eq!(started.state, ProcessState::Running);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let report = supervisor.check(started.pid)?;
    assert_eq!(report.state, ProcessState::Exited { code: Some(0) });
    assert_eq!(report.output, vec!["done".to_owned()]);
    assert!(matches!(
        supervisor.check(started.pid),
        Err(BackgroundError::NotTracked { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn process_ignoring_sigterm_is_killed_after_grace_period() -> TestResult {
    let dir = TempDir::new()?;
    let supervisor = BackgroundSupervisor::new(dir.path());

    let started = supervisor
        .start(
            "trap '' TERM; while true; do sleep 0.2; done",
            Duration::from_millis(500),
        )
        .await?;
    assert_eq!(started.state, ProcessState::Running);

    let begun = std::time::Instant::now();
    let outcome = supervisor.stop(started.pid).await?;
    assert_eq!(outcome, StopOutcome::Killed);
    assert!(begun.elapsed() >= STOP_GRACE_PERIOD);
    assert!(supervisor.list().is_empty());
    Ok(())
}

#[tokio::test]
async fn stopping_an_already_exited_process_reports_its_exit() -> TestResult {
    let dir = TempDir::new()?;
    let supervisor = BackgroundSupervisor::new(dir.path());

    let started = supervisor.start("sleep 1", Duration::from_millis(200)).await?;
    assert_eq!(started.state, ProcessState::Running);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let outcome = supervisor.stop(started.pid).await?;
    assert_eq!(outcome, StopOutcome::AlreadyExited { code: Some(0) });
    assert!(matches!(
        supervisor.stop(started.pid).await,
        Err(BackgroundError::NotTracked { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn abandoned_start_is_still_stopped_by_shutdown() -> TestResult {
    let dir = TempDir::new()?;
    let supervisor = BackgroundSupervisor::new(dir.path());

    let abandoned = tokio::time::timeout(
        Duration::from_millis(300),
        supervisor.start("sleep 100", Duration::from_secs(10)),
    )
    .await;
    assert!(abandoned.is_err());

    let pids = supervisor.tracked_pids();
    assert_eq!(pids.len(), 1);
    let summary = supervisor.list();
    assert_eq!(summary[0].state, ProcessState::Starting);

    supervisor.shutdown().await;
    assert!(supervisor.tracked_pids().is_empty());
    Ok(())
}

#[tokio::test]
async fn noisy_process_output_stays_bounded() -> TestResult {
    let dir = TempDir::new()?;
    let supervisor = BackgroundSupervisor::new(dir.path());

    let started = supervisor
        .start(
            "i=0; while [ $i -lt 2000 ]; do echo line$i; i=$((i+1)); done; sleep 100",
            Duration::from_secs(2),
        )
        .await?;
    let summary = supervisor.list();
    assert_eq!(summary.len(), 1);
    assert!(summary[0].buffered_lines <= OUTPUT_BUFFER_HARD_CAP);
    assert!(summary[0].buffered_lines >= OUTPUT_BUFFER_RETAIN);

    let report = supervisor.check(started.pid)?;
    assert!(report.dropped_lines > 0);
    assert_eq!(report.output.last().map(String::as_str), Some("line1999"));
    supervisor.stop(started.pid).await?;
    Ok(())
}

#[tokio::test]
async fn shell_command_reports_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let shell = ShellExecutor::new(dir.path());

    let output = shell.run("echo hi; echo err >&2; exit 4").await?;
    assert_eq!(output.exit_code, Some(4));
    assert_eq!(output.render(10_000), "hi\n\nerr\n\n(exit code: 4)");
    Ok(())
}

#[tokio::test]
async fn shell_command_runs_in_working_dir() -> TestResult {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("marker.txt"), "x")?;
    let shell = ShellExecutor::new(dir.path());

    let output = shell.run("ls").await?;
    assert!(output.success());
    assert!(output.stdout.contains("marker.txt"));
    Ok(())
}

#[tokio::test]
async fn shell_command_times_out() -> TestResult {
    let dir = TempDir::new()?;
    let shell = ShellExecutor::new(dir.path()).with_timeout(Duration::from_millis(300));

    let started = std::time::Instant::now();
    let result = shell.run("sleep 30").await;
    assert!(matches!(result, Err(ShellError::Timeout { .. })));
    assert!(started.elapsed() < Duration::from_secs(10));
    Ok(())
}

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG_VARS: [&str; 4] = [
    "MARAUDER_BASE_URL",
    "MARAUDER_API_KEY",
    "MARAUDER_MODEL",
    "MARAUDER_CONTEXT_LIMIT",
];

/// The binary with a private home directory and no inherited config.
fn isolated_command(home: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("marauder")?;
    cmd.current_dir(home.path()).env("HOME", home.path());
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn help_lists_session_flags() -> Result<()> {
    let mut cmd = Command::cargo_bin("marauder")?;
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--skip-connection-test"))
        .stdout(predicate::str::contains("--print"))
        .stdout(predicate::str::contains("[WORKSPACE]"));
    Ok(())
}

#[test]
fn positional_workspace_path_must_exist() -> Result<()> {
    let home = TempDir::new()?;
    let missing_workspace = home.path().join("missing-workspace");

    let mut cmd = isolated_command(&home)?;
    cmd.arg(&missing_workspace).arg("-p").arg("hello");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn incomplete_config_fails_without_a_terminal() -> Result<()> {
    let home = TempDir::new()?;

    let mut cmd = isolated_command(&home)?;
    cmd.arg(home.path()).arg("-p").arg("hello");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Configuration is incomplete"))
        .stderr(predicate::str::contains("api_key"));
    Ok(())
}

#[test]
fn setup_flag_needs_a_terminal() -> Result<()> {
    let home = TempDir::new()?;

    let mut cmd = isolated_command(&home)?;
    cmd.arg(home.path()).arg("--setup").write_stdin("");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--setup needs an interactive terminal"));
    Ok(())
}

#[test]
fn unknown_view_mode_is_rejected() -> Result<()> {
    let mut cmd = Command::cargo_bin("marauder")?;
    cmd.arg("--mode").arg("verbose");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'verbose'"));
    Ok(())
}

#[test]
fn dotenv_settings_apply_and_are_logged() -> Result<()> {
    let home = TempDir::new()?;
    std::fs::write(
        home.path().join(".env"),
        "RUST_LOG=marauder=info\nMARAUDER_MODEL=from-dotenv\n",
    )?;

    let mut cmd = isolated_command(&home)?;
    cmd.arg(home.path()).arg("-p").arg("hello");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("loaded environment variables"))
        .stderr(predicate::str::contains("(missing: api_key)"));
    Ok(())
}

#[test]
fn unusable_log_directory_is_reported_and_run_continues() -> Result<()> {
    let home = TempDir::new()?;
    // a plain file where the log directory should be created
    std::fs::write(home.path().join(".marauder"), "")?;

    let mut cmd = isolated_command(&home)?;
    cmd.arg(home.path()).arg("--debug").arg("-p").arg("hello");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(
            "warning: failed to initialize debug logging",
        ))
        .stderr(predicate::str::contains("Configuration is incomplete"));
    Ok(())
}

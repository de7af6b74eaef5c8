use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use marauder_config::ConfigPaths;
use marauder_config::constants::paths::DEBUG_LOG_FILE_NAME;

use crate::cli::Cli;

const DEBUG_LOG_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_DEBUG_TARGETS: &str =
    "marauder=debug,marauder_core=debug,marauder_config=debug,marauder_bash_runner=debug";

/// Install the tracing subscriber when `RUST_LOG` is set or `--debug` was
/// passed. Returns whether logging is on.
///
/// Interactive sessions and `--debug` log to a file so the terminal is never
/// corrupted; `RUST_LOG` alone in print mode logs to stderr.
pub(crate) fn initialize_tracing(args: &Cli, interactive: bool) -> Result<bool> {
    use tracing_subscriber::prelude::*;

    let rust_log_set = std::env::var("RUST_LOG").is_ok();
    if !rust_log_set && !args.debug {
        return Ok(false);
    }

    let env_filter = if rust_log_set {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        tracing_subscriber::EnvFilter::new(DEFAULT_DEBUG_TARGETS)
    };

    if interactive || args.debug {
        let log_file = prepare_debug_log_file()?;
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open debug log file")?;

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false);

        let init_result = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();

        match init_result {
            Ok(()) => tracing::info!(log_file = %log_file.display(), "debug tracing enabled"),
            Err(err) => {
                tracing::warn!(error = %err, "tracing already initialized; skipping file tracing setup");
            }
        }
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);
        let init_result = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();

        if let Err(err) = init_result {
            tracing::warn!(error = %err, "tracing already initialized; skipping env tracing setup");
        }
    }

    Ok(true)
}

fn prepare_debug_log_file() -> Result<PathBuf> {
    let log_dir = ConfigPaths::from_home_dir()?.log_dir();
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create debug log directory {}", log_dir.display()))?;
    let log_file = log_dir.join(DEBUG_LOG_FILE_NAME);
    rotate_debug_log_if_needed(&log_file, DEBUG_LOG_MAX_BYTES)?;
    Ok(log_file)
}

fn rotate_debug_log_if_needed(log_file: &Path, max_bytes: u64) -> Result<()> {
    let metadata = match fs::metadata(log_file) {
        Ok(value) => value,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to inspect debug log {}", log_file.display()));
        }
    };

    if metadata.len() < max_bytes {
        return Ok(());
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let rotated = log_file.with_file_name(format!("marauder-debug-{timestamp}.log"));
    fs::rename(log_file, &rotated)
        .with_context(|| format!("Failed to rotate debug log {}", log_file.display()))?;
    Ok(())
}

/// The prompt for `--print`: piped stdin, the inline text, or both (stdin
/// first, separated by a blank line).
pub(crate) fn build_print_prompt(print_value: &str) -> Result<String> {
    let piped_input = collect_piped_stdin()?;
    combine_print_prompt(piped_input, print_value)
}

fn combine_print_prompt(piped_input: Option<String>, print_value: &str) -> Result<String> {
    let inline_prompt = if print_value.trim().is_empty() || print_value == "-" {
        None
    } else {
        Some(print_value)
    };

    match (piped_input, inline_prompt) {
        (Some(piped), Some(prompt)) => {
            let mut combined = piped;
            if !combined.ends_with("\n\n") {
                if combined.ends_with('\n') {
                    combined.push('\n');
                } else {
                    combined.push_str("\n\n");
                }
            }
            combined.push_str(prompt);
            Ok(combined)
        }
        (Some(piped), None) => Ok(piped),
        (None, Some(prompt)) => Ok(prompt.to_owned()),
        (None, None) => Err(anyhow::anyhow!(
            "No prompt provided. Pass text to -p/--print or pipe input via stdin."
        )),
    }
}

fn collect_piped_stdin() -> Result<Option<String>> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .context("Failed to read prompt from stdin")?;

    if buffer.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(buffer))
    }
}

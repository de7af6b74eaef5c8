//! Marauder - terminal coding agent
//!
//! Thin binary entry point: parse flags, resolve the connection and the
//! workspace, then hand over to the interactive session or a single
//! `--print` turn.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use marauder_config::load_dotenv;
use marauder_core::llm::verify_connection;
use marauder_core::utils::colors::style;
use marauder_core::{AgentRunner, OpenAICompatibleProvider, ToolRegistry};
use tracing::{info, warn};

mod agent;
mod cli;
mod main_helpers;

use agent::runloop::{self, SessionSettings};
use cli::{Cli, ViewMode};
use main_helpers::{build_print_prompt, initialize_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment; reported once logging is up.
    let dotenv = load_dotenv();

    let args = Cli::parse();
    let interactive =
        !args.is_print_mode() && io::stdin().is_terminal() && io::stdout().is_terminal();
    let color = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();

    if let Err(err) = initialize_tracing(&args, interactive) {
        eprintln!("warning: failed to initialize debug logging: {err:#}");
    }
    match dotenv {
        Ok(Some(path)) => info!(path = %path.display(), "loaded environment variables"),
        Ok(None) => {}
        Err(err) => {
            warn!(error = %err, "ignoring .env file");
            eprintln!("warning: {err}");
        }
    }

    // A bad explicit workspace fails before any prompt or network call.
    let explicit_workspace = args
        .workspace
        .as_deref()
        .map(cli::validate_workspace)
        .transpose()?;

    if interactive {
        println!("{}", runloop::render_banner(color));
    }

    let config = cli::load_connection_config(&args, interactive)?;
    info!(model = %config.model, base_url = %config.base_url, "connection configured");

    let provider = Arc::new(
        OpenAICompatibleProvider::from_config(&config).context("Failed to create the model client")?,
    );

    if !args.skip_connection_test {
        if interactive {
            println!(
                "  🔌 Testing connection to {} with model {}...",
                style(&config.base_url).cyan().render(color),
                style(&config.model).cyan().render(color)
            );
        }
        verify_connection(provider.as_ref(), &config.model)
            .await
            .context("Could not connect. Check your URL, key, and model.")?;
        if interactive {
            println!("  {}\n", style("✓ Connection successful!").green().render(color));
        }
    }

    let workspace = cli::resolve_workspace(explicit_workspace.as_deref(), interactive)?;
    if interactive {
        println!(
            "  {}\n",
            style(format!("✓ Working in: {}", workspace.display()))
                .green()
                .render(color)
        );
    }

    let tools = Arc::new(
        ToolRegistry::new(&workspace)
            .with_context(|| format!("Failed to prepare tools for {}", workspace.display()))?,
    );
    let runner = AgentRunner::new(provider, tools, config.model.clone())
        .with_context_limit(config.context_limit);

    if let Some(print_value) = args.print.as_deref() {
        let prompt = build_print_prompt(print_value)?;
        return runloop::run_print(&runner, &prompt).await;
    }

    let mode = match args.mode {
        Some(mode) => mode,
        None if interactive => runloop::choose_view_mode()?,
        None => ViewMode::Normal,
    };
    if interactive {
        println!("  {}\n", style(format!("→ {mode} mode.")).dimmed().render(color));
    }

    runloop::run_interactive(runner, SessionSettings { mode, color }).await
}

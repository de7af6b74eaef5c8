//! The interactive session and the one-shot `--print` run.

mod context_usage;
mod display;
mod slash_commands;
mod ticker;
mod tool_output;
mod welcome;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use dialoguer::Select;
use marauder_core::utils::colors::style;
use marauder_core::{AgentRunner, ConversationSession, NoopObserver, TurnError, TurnOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::cli::ViewMode;
use context_usage::render_context_bar;
use display::{TerminalObserver, render_answer, render_turn_summary};
use slash_commands::{SlashCommandOutcome, parse_slash_command, render_help};
use ticker::{StatusTicker, TickerState};

pub use welcome::render_banner;

/// Display settings for one interactive session.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub mode: ViewMode,
    pub color: bool,
}

enum TurnExit {
    Completed,
    Interrupted,
}

/// Ask for the view mode when none was given on the command line.
pub fn choose_view_mode() -> Result<ViewMode> {
    let options = [
        "normal - clean timer + summary (recommended)",
        "advanced - see every file read/write/edit live",
    ];
    let selection = Select::new()
        .with_prompt("View mode")
        .default(0)
        .items(&options)
        .interact()?;
    Ok(if selection == 1 {
        ViewMode::Advanced
    } else {
        ViewMode::Normal
    })
}

fn farewell(color: bool) {
    println!("  {}", style("👋 Later!").dimmed().render(color));
}

/// Read prompts until `/quit`, EOF or Ctrl-C, then stop every background
/// process the session started.
pub async fn run_interactive(runner: AgentRunner, settings: SessionSettings) -> Result<()> {
    let color = settings.color;
    let mut mode = settings.mode;
    let mut session = ConversationSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", welcome::render_commands_hint(color));
    info!(workspace = %runner.tools().workspace().display(), %mode, "interactive session started");

    loop {
        if let Some(bar) =
            render_context_bar(session.usage.last_prompt_tokens, runner.context_limit(), color)
        {
            println!("{bar}");
        }
        print!("{}", style("you > ").bold().render(color));
        io::stdout().flush().context("Failed to flush stdout")?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            farewell(color);
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = parse_slash_command(input) {
            match command {
                SlashCommandOutcome::Exit => {
                    farewell(color);
                    break;
                }
                SlashCommandOutcome::ClearConversation => {
                    session.clear();
                    println!("  {}", style("Context cleared.").dimmed().render(color));
                }
                SlashCommandOutcome::ToggleMode => {
                    mode = mode.toggled();
                    println!(
                        "  {}",
                        style(format!("Switched to {mode} mode.")).dimmed().render(color)
                    );
                }
                SlashCommandOutcome::Compact => compact_session(&runner, &mut session, color).await,
                SlashCommandOutcome::ShowHelp => println!("{}", render_help()),
                SlashCommandOutcome::Unknown(command) => println!(
                    "  {}",
                    style(format!("Unknown command {command}. Type /help for the list."))
                        .yellow()
                        .render(color)
                ),
            }
            continue;
        }

        if let TurnExit::Interrupted = run_turn(&runner, &mut session, input, mode, color).await {
            println!();
            farewell(color);
            break;
        }
    }

    runner.tools().shutdown().await;
    Ok(())
}

async fn compact_session(runner: &AgentRunner, session: &mut ConversationSession, color: bool) {
    match runner.compact(session).await {
        Ok(()) => println!(
            "  {}",
            style(format!(
                "Conversation compacted ({} compactions left).",
                session.compactor.remaining()
            ))
            .green()
            .render(color)
        ),
        Err(err) => {
            warn!(error = %err, "manual compaction failed");
            println!(
                "  {}",
                style(format!("Compaction failed: {err}")).red().render(color)
            );
        }
    }
}

async fn run_turn(
    runner: &AgentRunner,
    session: &mut ConversationSession,
    input: &str,
    mode: ViewMode,
    color: bool,
) -> TurnExit {
    let ticker_state = Arc::new(TickerState::new(Instant::now()));
    let observer = TerminalObserver::new(
        mode,
        color,
        Arc::clone(&ticker_state),
        session.usage.total(),
    );
    let ticker = (mode == ViewMode::Normal).then(|| StatusTicker::start(ticker_state, color));

    let result = tokio::select! {
        result = runner.run_turn(session, input, &observer) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    if let Some(ticker) = ticker {
        ticker.stop().await;
    }

    let report = match result {
        None => {
            println!("  {}", style("Interrupted.").yellow().render(color));
            return TurnExit::Interrupted;
        }
        Some(Err(TurnError::Transport(err))) => {
            println!("  {}", style(format!("API error: {err}")).red().render(color));
            return TurnExit::Completed;
        }
        Some(Ok(report)) => report,
    };

    if mode == ViewMode::Normal {
        for line in render_turn_summary(&report, color) {
            println!("{line}");
        }
        println!();
    }
    if let Some(answer) = report.answer().filter(|text| !text.is_empty()) {
        println!("{}", render_answer(answer, color));
    }
    TurnExit::Completed
}

/// Run one turn without the REPL and print the final answer to stdout.
pub async fn run_print(runner: &AgentRunner, prompt: &str) -> Result<()> {
    let mut session = ConversationSession::new();
    let result = runner.run_turn(&mut session, prompt, &NoopObserver).await;
    runner.tools().shutdown().await;

    let report = result.context("Model request failed")?;
    match report.outcome {
        TurnOutcome::Answered(text) => {
            println!("{text}");
            Ok(())
        }
        TurnOutcome::RoundLimit => {
            bail!("Stopped after reaching the tool round limit without a final answer")
        }
    }
}

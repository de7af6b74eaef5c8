use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use marauder_config::PartialConfig;

/// How much of a turn the REPL shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ViewMode {
    /// Status ticker and a short summary per turn
    #[default]
    Normal,
    /// Every tool call, its result and the model's reasoning
    Advanced,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Normal => ViewMode::Advanced,
            ViewMode::Advanced => ViewMode::Normal,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Normal => f.write_str("normal"),
            ViewMode::Advanced => f.write_str("advanced"),
        }
    }
}

/// Marauder - a terminal coding agent for OpenAI-compatible models
#[derive(Debug, Parser)]
#[command(name = "marauder", version, about, long_about = None)]
pub struct Cli {
    /// Directory the agent may read, write and run commands in
    #[arg(value_name = "WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// OpenAI-compatible API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// API key for the endpoint
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Context window of the model, in tokens
    #[arg(long, value_name = "TOKENS")]
    pub context_limit: Option<u64>,

    /// Display mode for the interactive session
    #[arg(long, value_enum)]
    pub mode: Option<ViewMode>,

    /// Ask for connection settings even when a saved config exists
    #[arg(long)]
    pub setup: bool,

    /// Skip the startup request that checks the endpoint
    #[arg(long)]
    pub skip_connection_test: bool,

    /// Write debug logs to ~/.marauder/logs
    #[arg(long)]
    pub debug: bool,

    /// Run a single prompt without the interactive session and print the answer
    #[arg(short = 'p', long = "print", value_name = "PROMPT")]
    pub print: Option<String>,
}

impl Cli {
    /// Connection settings given on the command line, the highest config layer.
    pub fn runtime_overrides(&self) -> PartialConfig {
        PartialConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            context_limit: self.context_limit,
        }
    }

    pub fn is_print_mode(&self) -> bool {
        self.print.is_some()
    }
}

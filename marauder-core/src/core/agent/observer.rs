use std::fmt;

use serde_json::Value;

use super::usage::TokenUsage;
use crate::llm::ToolCall;

/// What the engine is doing right now; shown by the status ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPhase {
    WaitingForApi,
    ProcessingResponse,
    ThinkingDeeply,
    /// Executing a tool; the label comes from `short_action`.
    Running(String),
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnPhase::WaitingForApi => f.write_str("waiting for API..."),
            TurnPhase::ProcessingResponse => f.write_str("processing response"),
            TurnPhase::ThinkingDeeply => f.write_str("thinking deeply..."),
            TurnPhase::Running(label) => f.write_str(label),
        }
    }
}

/// Receives progress from [`super::AgentRunner::run_turn`].
///
/// Callbacks run inline on the engine task and must not block.
pub trait TurnObserver: Send + Sync {
    fn on_phase(&self, _phase: &TurnPhase) {}

    /// Session totals after each API call.
    fn on_usage(&self, _usage: &TokenUsage) {}

    fn on_reasoning(&self, _reasoning: &str) {}

    fn on_tool_started(&self, _call: &ToolCall, _args: &Value) {}

    /// `result` is the capped text that was stored in history.
    fn on_tool_finished(&self, _call: &ToolCall, _args: &Value, _result: &str) {}

    /// Text that accompanied tool calls (the final answer is in the report).
    fn on_assistant_text(&self, _text: &str) {}

    fn on_notice(&self, _notice: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TurnObserver for NoopObserver {}

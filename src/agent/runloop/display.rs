use std::sync::Arc;

use marauder_core::llm::ToolCall;
use marauder_core::utils::colors::style;
use marauder_core::utils::tokens::fmt_tokens;
use marauder_core::{TokenUsage, TurnObserver, TurnPhase, TurnReport};
use serde_json::Value;

use super::ticker::{TickerState, clear_status};
use super::tool_output::{
    Tone, render_block, render_reasoning, render_result, render_tool_call, tool_result_view,
};
use crate::cli::ViewMode;

/// Prints a turn's progress for the selected view mode and feeds the ticker.
pub struct TerminalObserver {
    mode: ViewMode,
    color: bool,
    ticker: Arc<TickerState>,
    /// Session token total when the turn started; the ticker shows the turn's share.
    token_baseline: u64,
}

impl TerminalObserver {
    pub fn new(mode: ViewMode, color: bool, ticker: Arc<TickerState>, token_baseline: u64) -> Self {
        Self {
            mode,
            color,
            ticker,
            token_baseline,
        }
    }

    fn advanced(&self) -> bool {
        self.mode == ViewMode::Advanced
    }
}

impl TurnObserver for TerminalObserver {
    fn on_phase(&self, phase: &TurnPhase) {
        self.ticker.set_phase(phase.to_string());
    }

    fn on_usage(&self, usage: &TokenUsage) {
        self.ticker
            .set_tokens(usage.total().saturating_sub(self.token_baseline));
    }

    fn on_reasoning(&self, reasoning: &str) {
        if self.advanced() {
            println!("{}", render_reasoning(reasoning, self.color));
        }
    }

    fn on_tool_started(&self, call: &ToolCall, args: &Value) {
        self.ticker.record_action();
        if self.advanced() {
            println!("{}", render_tool_call(call.name(), args, self.color));
        }
    }

    fn on_tool_finished(&self, call: &ToolCall, args: &Value, result: &str) {
        if self.advanced() {
            let view = tool_result_view(call.name(), args, result);
            println!("{}", render_result(&view, self.color));
        }
    }

    fn on_assistant_text(&self, text: &str) {
        if self.advanced() {
            println!("{}", render_answer(text, self.color));
        }
    }

    fn on_notice(&self, notice: &str) {
        if !self.advanced() {
            // The ticker redraws on its next tick.
            let _ = clear_status();
        }
        println!("  {}", style(notice).yellow().render(self.color));
    }
}

/// Normal-mode summary lines printed after the ticker stops.
pub fn render_turn_summary(report: &TurnReport, color: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "  {}",
        style(format!(
            "✓ Done in {:.1}s - {} actions",
            report.elapsed.as_secs_f64(),
            report.actions
        ))
        .green()
        .render(color)
    )];

    if !report.files_touched.is_empty() {
        lines.push(format!(
            "  {}",
            style(format!("Files touched: {}", report.files_touched.join(", ")))
                .dimmed()
                .render(color)
        ));
    }

    let usage = &report.usage;
    if usage.total() > 0 {
        lines.push(format!(
            "  {}",
            style(format!(
                "Tokens: {} in / {} out / {} total ({} API calls)",
                fmt_tokens(usage.prompt_tokens),
                fmt_tokens(usage.completion_tokens),
                fmt_tokens(usage.total()),
                usage.api_calls
            ))
            .dimmed()
            .render(color)
        ));
    }
    lines
}

pub fn render_answer(text: &str, color: bool) -> String {
    render_block("Marauder", text, Tone::Info, color)
}

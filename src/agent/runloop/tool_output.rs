//! What advanced mode prints for each tool call and result.

use marauder_config::constants::ui::{MAX_DISPLAY_ENTRIES, MAX_DISPLAY_LINES, MAX_REASONING_DISPLAY_CHARS};
use marauder_core::tools::{ToolKind, tool_call_summary};
use marauder_core::utils::colors::style;
use marauder_core::utils::text::clip_with_suffix;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Error,
    Success,
    Warning,
    Info,
    Plain,
}

/// A result as shown to the user: either a one-line status or a titled block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Line { tone: Tone, text: String },
    Block { tone: Tone, title: String, body: String },
}

/// The first `max` lines of `text`, with a `... (N more <unit>)` line when
/// anything was cut.
pub fn clip_lines(text: &str, max: usize, unit: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() <= max {
        return text.to_owned();
    }
    let mut shown = lines.iter().take(max).copied().collect::<Vec<_>>().join("\n");
    shown.push_str(&format!("\n... ({} more {unit})", lines.len() - max));
    shown
}

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default()
}

pub fn tool_result_view(name: &str, args: &Value, result: &str) -> ResultView {
    if result.starts_with("Error:") {
        return ResultView::Line {
            tone: Tone::Error,
            text: format!("→ {result}"),
        };
    }

    let Some(kind) = ToolKind::from_name(name) else {
        return ResultView::Line {
            tone: Tone::Plain,
            text: format!("→ {result}"),
        };
    };

    let path = str_arg(args, "path");
    match kind {
        ToolKind::ReadFile => ResultView::Block {
            tone: Tone::Info,
            title: format!("📄 {path} ({} lines)", result.split('\n').count()),
            body: clip_lines(result, MAX_DISPLAY_LINES, "lines"),
        },
        ToolKind::WriteFile => {
            let content = str_arg(args, "content");
            ResultView::Block {
                tone: Tone::Success,
                title: format!("✏️  wrote {path} ({} lines)", content.split('\n').count()),
                body: clip_lines(content, MAX_DISPLAY_LINES, "lines"),
            }
        }
        ToolKind::EditFile => ResultView::Line {
            tone: Tone::Success,
            text: format!("→ {result}"),
        },
        ToolKind::ListFiles => ResultView::Block {
            tone: Tone::Warning,
            title: format!("📁 {}", if path.is_empty() { "." } else { path }),
            body: clip_lines(result, MAX_DISPLAY_ENTRIES, "entries"),
        },
        ToolKind::RunCommand => ResultView::Block {
            tone: Tone::Plain,
            title: format!("$ {}", str_arg(args, "command")),
            body: clip_lines(result, MAX_DISPLAY_LINES, "lines"),
        },
        ToolKind::RunBackground => ResultView::Block {
            tone: Tone::Plain,
            title: format!("🚀 bg: {}", str_arg(args, "command")),
            body: clip_lines(result, MAX_DISPLAY_LINES, "lines"),
        },
        ToolKind::CheckBackground | ToolKind::ListBackground => ResultView::Block {
            tone: Tone::Info,
            title: "📡 process status".to_owned(),
            body: clip_lines(result, MAX_DISPLAY_LINES, "lines"),
        },
        ToolKind::StopBackground => ResultView::Line {
            tone: Tone::Warning,
            text: format!("→ {result}"),
        },
    }
}

fn paint(text: &str, tone: Tone, color: bool) -> String {
    let styled = match tone {
        Tone::Error => style(text).red(),
        Tone::Success => style(text).green(),
        Tone::Warning => style(text).yellow(),
        Tone::Info => style(text).cyan(),
        Tone::Plain => style(text).dimmed(),
    };
    styled.render(color)
}

/// A titled block with a left rule.
pub fn render_block(title: &str, body: &str, tone: Tone, color: bool) -> String {
    let mut out = format!("  {} {}", paint("┌", tone, color), style(title).bold().render(color));
    for line in body.split('\n') {
        out.push_str(&format!("\n  {} {line}", paint("│", tone, color)));
    }
    out.push_str(&format!("\n  {}", paint("└", tone, color)));
    out
}

pub fn render_result(view: &ResultView, color: bool) -> String {
    match view {
        ResultView::Line { tone, text } => format!("  {}", paint(text, *tone, color)),
        ResultView::Block { tone, title, body } => render_block(title, body, *tone, color),
    }
}

/// `  ⚡ name(summary)`
pub fn render_tool_call(name: &str, args: &Value, color: bool) -> String {
    let line = format!("⚡ {name}({})", tool_call_summary(name, args));
    format!("  {}", style(line).dimmed().render(color))
}

pub fn render_reasoning(reasoning: &str, color: bool) -> String {
    let clipped = clip_with_suffix(reasoning, MAX_REASONING_DISPLAY_CHARS, "...");
    let mut out = format!("  {}", style("💭 Thinking").magenta().render(color));
    for line in clipped.split('\n') {
        out.push_str(&format!("\n  {}", style(format!("│ {line}")).dimmed().italic().render(color)));
    }
    out
}

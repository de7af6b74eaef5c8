//! Short human-readable labels for tool calls: the ticker phase, the
//! advanced-mode call line, and the files-touched list.

use marauder_config::constants::ui::{PHASE_COMMAND_CHARS, TOOL_SUMMARY_COMMAND_CHARS};
use serde_json::Value;

use super::kind::ToolKind;
use crate::utils::text::{char_len, clip_chars};

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn pid_arg(args: &Value) -> String {
    match args.get("pid") {
        Some(Value::String(pid)) => pid.clone(),
        Some(Value::Null) | None => "?".to_owned(),
        Some(other) => other.to_string(),
    }
}

/// Ticker phase for a call, e.g. `reading src/main.rs`.
pub fn short_action(name: &str, args: &Value) -> String {
    let Some(kind) = ToolKind::from_name(name) else {
        return name.to_owned();
    };
    let path = str_arg(args, "path");
    let command = clip_chars(str_arg(args, "command"), PHASE_COMMAND_CHARS);
    match kind {
        ToolKind::ReadFile => format!("reading {path}"),
        ToolKind::WriteFile => format!("writing {path}"),
        ToolKind::EditFile => format!("editing {path}"),
        ToolKind::ListFiles => "listing files".to_owned(),
        ToolKind::RunCommand => format!("running {command}"),
        ToolKind::RunBackground => format!("launching {command}"),
        ToolKind::CheckBackground => format!("checking process {}", pid_arg(args)),
        ToolKind::StopBackground => format!("stopping process {}", pid_arg(args)),
        ToolKind::ListBackground => "listing processes".to_owned(),
    }
}

/// Argument summary shown as `⚡ name(summary)`.
pub fn tool_call_summary(name: &str, args: &Value) -> String {
    let Some(kind) = ToolKind::from_name(name) else {
        return clip_chars(&args.to_string(), 80).to_owned();
    };
    match kind {
        ToolKind::ReadFile | ToolKind::EditFile => str_arg(args, "path").to_owned(),
        ToolKind::WriteFile => format!(
            "{} ({} chars)",
            str_arg(args, "path"),
            char_len(str_arg(args, "content"))
        ),
        ToolKind::ListFiles => args
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or(".")
            .to_owned(),
        ToolKind::RunCommand | ToolKind::RunBackground => {
            let command = str_arg(args, "command");
            if char_len(command) < TOOL_SUMMARY_COMMAND_CHARS {
                command.to_owned()
            } else {
                format!("{}...", clip_chars(command, TOOL_SUMMARY_COMMAND_CHARS))
            }
        }
        ToolKind::CheckBackground | ToolKind::StopBackground => format!("PID {}", pid_arg(args)),
        ToolKind::ListBackground => String::new(),
    }
}

/// Path a call writes to, if it is a file-modifying call.
pub fn touched_path(name: &str, args: &Value) -> Option<String> {
    ToolKind::from_name(name)
        .filter(|kind| kind.modifies_files())
        .and_then(|_| args.get("path"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

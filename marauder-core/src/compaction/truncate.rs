use marauder_config::constants::compaction::{
    AGED_EDIT_SNIPPET_CHARS, AGED_TOOL_RESULT_EDGE_LINES, AGED_TOOL_RESULT_LINE_THRESHOLD,
    MAX_AGED_ASSISTANT_CHARS, MAX_AGED_TOOL_ARGS_CHARS, MAX_AGED_TOOL_RESULT_CHARS,
    RECENT_MESSAGES_INTACT,
};
use serde_json::Value;

use crate::llm::{Message, MessageRole, ToolCall};
use crate::tools::ToolKind;
use crate::utils::text::{char_len, clip_chars};

/// How old a message is relative to the end of the outbound history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    /// Among the last few messages; sent verbatim.
    Recent,
    Aged,
}

/// Copy of `history` with every aged message shortened.
pub fn prepare_outbound(history: &[Message]) -> Vec<Message> {
    let recent_from = history.len().saturating_sub(RECENT_MESSAGES_INTACT);
    history
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let age = if index >= recent_from {
                AgeBucket::Recent
            } else {
                AgeBucket::Aged
            };
            truncate_message(message, age)
        })
        .collect()
}

/// Shorten one message. Roles, call ids and call order never change.
pub fn truncate_message(message: &Message, age: AgeBucket) -> Message {
    if age == AgeBucket::Recent {
        return message.clone();
    }

    match message.role {
        MessageRole::Tool => Message {
            content: shorten_tool_result(&message.content),
            ..message.clone()
        },
        MessageRole::Assistant => Message {
            content: shorten_text(&message.content, MAX_AGED_ASSISTANT_CHARS, "..."),
            tool_calls: message
                .tool_calls
                .as_ref()
                .map(|calls| calls.iter().map(shorten_call).collect()),
            ..message.clone()
        },
        MessageRole::System | MessageRole::User => message.clone(),
    }
}

fn shorten_text(text: &str, limit: usize, suffix: &str) -> String {
    if char_len(text) <= limit {
        return text.to_owned();
    }
    format!("{}{suffix}", clip_chars(text, limit))
}

fn shorten_tool_result(content: &str) -> String {
    if char_len(content) <= MAX_AGED_TOOL_RESULT_CHARS {
        return content.to_owned();
    }

    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() <= AGED_TOOL_RESULT_LINE_THRESHOLD {
        return format!("{}...(truncated)", clip_chars(content, MAX_AGED_TOOL_RESULT_CHARS));
    }

    let omitted = lines.len() - 2 * AGED_TOOL_RESULT_EDGE_LINES;
    let mut kept: Vec<String> = lines
        .iter()
        .take(AGED_TOOL_RESULT_EDGE_LINES)
        .map(|line| (*line).to_owned())
        .collect();
    kept.push(format!("... ({omitted} lines omitted) ..."));
    kept.extend(
        lines
            .iter()
            .skip(lines.len() - AGED_TOOL_RESULT_EDGE_LINES)
            .map(|line| (*line).to_owned()),
    );
    clip_chars(&kept.join("\n"), MAX_AGED_TOOL_RESULT_CHARS).to_owned()
}

fn shorten_call(call: &ToolCall) -> ToolCall {
    let arguments = &call.function.arguments;
    if char_len(arguments) <= MAX_AGED_TOOL_ARGS_CHARS {
        return call.clone();
    }

    let compressed = match ToolKind::from_name(call.name()) {
        Some(ToolKind::WriteFile) => compress_object(arguments, |args| {
            let written = args.get("content").and_then(Value::as_str).map_or(0, char_len);
            args.insert("content".to_owned(), Value::from(format!("[{written} chars written]")));
        }),
        Some(ToolKind::EditFile) => compress_object(arguments, |args| {
            for key in ["old_str", "new_str"] {
                let snippet = args.get(key).and_then(Value::as_str).unwrap_or_default();
                let snippet = format!("{}...", clip_chars(snippet, AGED_EDIT_SNIPPET_CHARS));
                args.insert(key.to_owned(), Value::from(snippet));
            }
        }),
        _ => None,
    };

    let mut shortened = call.clone();
    shortened.function.arguments = compressed.unwrap_or_else(|| {
        format!("{}...", clip_chars(arguments, MAX_AGED_TOOL_ARGS_CHARS))
    });
    shortened
}

/// Rewrite a JSON object argument string; `None` when it is not an object.
fn compress_object(
    arguments: &str,
    rewrite: impl FnOnce(&mut serde_json::Map<String, Value>),
) -> Option<String> {
    let Ok(Value::Object(mut args)) = serde_json::from_str::<Value>(arguments) else {
        return None;
    };
    rewrite(&mut args);
    serde_json::to_string(&Value::Object(args)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn recent_messages_are_verbatim() {
        let long = "x".repeat(5_000);
        let history = vec![
            Message::user("start"),
            Message::tool_response("c1", long.clone()),
            Message::assistant(long.clone()),
            Message::tool_response("c2", long.clone()),
            Message::user(long.clone()),
        ];
        let outbound = prepare_outbound(&history);
        assert_eq!(outbound[1].content, long);
        assert_eq!(outbound[4].content, long);
        assert_eq!(outbound[0], history[0]);
    }

    #[test]
    fn aged_long_tool_result_keeps_edges() {
        let content: Vec<String> = (0..200).map(|i| format!("line {i:03} {}", "-".repeat(20))).collect();
        let message = Message::tool_response("c1", content.join("\n"));
        let shortened = truncate_message(&message, AgeBucket::Aged);

        assert!(shortened.content.starts_with("line 000"));
        assert!(shortened.content.contains("... (190 lines omitted) ..."));
        assert!(shortened.content.ends_with(&content[199]));
        assert_eq!(shortened.tool_call_id.as_deref(), Some("c1"));
    }

    #[test]
    fn aged_wide_tool_result_is_clipped() {
        let message = Message::tool_response("c1", "y".repeat(1_000));
        let shortened = truncate_message(&message, AgeBucket::Aged);
        assert_eq!(shortened.content, format!("{}...(truncated)", "y".repeat(800)));
    }

    #[test]
    fn aged_assistant_text_is_clipped() {
        let message = Message::assistant("z".repeat(301));
        let shortened = truncate_message(&message, AgeBucket::Aged);
        assert_eq!(shortened.content, format!("{}...", "z".repeat(300)));
    }

    #[test]
    fn aged_write_arguments_drop_file_body() {
        let args = json!({"path": "src/app.rs", "content": "a".repeat(500)}).to_string();
        let message = Message::assistant_with_tools("", vec![ToolCall::function("c1", "write_file", args)]);
        let shortened = truncate_message(&message, AgeBucket::Aged);
        let call = &shortened.tool_calls()[0];

        assert_eq!(call.id, "c1");
        assert_eq!(
            call.parsed_arguments().ok(),
            Some(json!({"path": "src/app.rs", "content": "[500 chars written]"}))
        );
    }

    #[test]
    fn aged_edit_arguments_keep_snippets() {
        let args = json!({"path": "a.py", "old_str": "o".repeat(150), "new_str": "n"}).to_string();
        let message = Message::assistant_with_tools("", vec![ToolCall::function("c1", "edit_file", args)]);
        let shortened = truncate_message(&message, AgeBucket::Aged);

        assert_eq!(
            shortened.tool_calls()[0].parsed_arguments().ok(),
            Some(json!({"path": "a.py", "old_str": format!("{}...", "o".repeat(60)), "new_str": "n..."}))
        );
    }

    #[test]
    fn unparsable_arguments_are_clipped() {
        let args = format!("{{\"command\": \"{}", "c".repeat(300));
        let message = Message::assistant_with_tools("", vec![ToolCall::function("c1", "write_file", args.clone())]);
        let shortened = truncate_message(&message, AgeBucket::Aged);
        assert_eq!(
            shortened.tool_calls()[0].function.arguments,
            format!("{}...", clip_chars(&args, 200))
        );
    }
}

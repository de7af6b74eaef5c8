use serde_json::{Map, Value, json};

use super::kind::ToolKind;
use crate::llm::ToolDefinition;

fn insert_string_property(
    properties: &mut Map<String, Value>,
    key: &str,
    description: &str,
    default: Option<&str>,
) {
    let mut value = json!({
        "type": "string",
        "description": description,
    });

    if let Some(default_value) = default
        && let Value::Object(ref mut obj) = value
    {
        obj.insert("default".to_string(), json!(default_value));
    }

    properties.insert(key.to_string(), value);
}

fn insert_number_property(
    properties: &mut Map<String, Value>,
    key: &str,
    kind: &str,
    description: &str,
    default: Option<Value>,
) {
    let mut value = json!({
        "type": kind,
        "description": description,
    });

    if let Some(default_value) = default
        && let Value::Object(ref mut obj) = value
    {
        obj.insert("default".to_string(), default_value);
    }

    properties.insert(key.to_string(), value);
}

fn object_schema(properties: Map<String, Value>, required: &[&str]) -> Value {
    let mut schema = json!({
        "type": "object",
        "properties": Value::Object(properties),
    });
    if !required.is_empty()
        && let Value::Object(ref mut obj) = schema
    {
        obj.insert("required".to_string(), json!(required));
    }
    schema
}

fn description(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::ReadFile => {
            "Read the contents of a file at the given path (relative to working directory)."
        }
        ToolKind::WriteFile => "Create or overwrite a file with the given content.",
        ToolKind::EditFile => {
            "Replace an exact string in a file with new content. The old_str must match exactly."
        }
        ToolKind::ListFiles => {
            "List files and directories at the given path. Returns a tree-like listing."
        }
        ToolKind::RunCommand => {
            "Run a shell command in the working directory and return stdout/stderr. \
             Commands are killed after 30 seconds; use run_background for servers and watchers."
        }
        ToolKind::RunBackground => {
            "Start a long-running command (dev server, watcher) in the background. \
             Waits a few seconds and returns the PID, status and startup output."
        }
        ToolKind::CheckBackground => {
            "Show the status, uptime and most recent output of a background process."
        }
        ToolKind::StopBackground => {
            "Stop a background process (SIGTERM, then SIGKILL if it does not exit)."
        }
        ToolKind::ListBackground => "List all background processes started in this session.",
    }
}

fn parameters(kind: ToolKind) -> Value {
    let mut properties = Map::new();
    let required: &[&str] = match kind {
        ToolKind::ReadFile => {
            insert_string_property(&mut properties, "path", "Relative file path to read.", None);
            &["path"]
        }
        ToolKind::WriteFile => {
            insert_string_property(&mut properties, "path", "Relative file path to write.", None);
            insert_string_property(
                &mut properties,
                "content",
                "Full file content to write.",
                None,
            );
            &["path", "content"]
        }
        ToolKind::EditFile => {
            insert_string_property(&mut properties, "path", "Relative file path to edit.", None);
            insert_string_property(
                &mut properties,
                "old_str",
                "Exact string to find and replace.",
                None,
            );
            insert_string_property(&mut properties, "new_str", "Replacement string.", None);
            &["path", "old_str", "new_str"]
        }
        ToolKind::ListFiles => {
            insert_string_property(
                &mut properties,
                "path",
                "Relative directory path. Use '.' for current dir.",
                Some("."),
            );
            insert_number_property(
                &mut properties,
                "depth",
                "integer",
                "Max depth to recurse. Default 2.",
                Some(json!(2)),
            );
            &[]
        }
        ToolKind::RunCommand => {
            insert_string_property(&mut properties, "command", "Shell command to execute.", None);
            &["command"]
        }
        ToolKind::RunBackground => {
            insert_string_property(
                &mut properties,
                "command",
                "Shell command to run in the background.",
                None,
            );
            insert_number_property(
                &mut properties,
                "wait_seconds",
                "number",
                "Seconds to wait for startup output (max 30). Default 5.",
                Some(json!(5)),
            );
            &["command"]
        }
        ToolKind::CheckBackground => {
            insert_number_property(
                &mut properties,
                "pid",
                "integer",
                "PID returned by run_background.",
                None,
            );
            &["pid"]
        }
        ToolKind::StopBackground => {
            insert_number_property(
                &mut properties,
                "pid",
                "integer",
                "PID of the process to stop.",
                None,
            );
            &["pid"]
        }
        ToolKind::ListBackground => &[],
    };
    object_schema(properties, required)
}

/// Schema entry for one tool.
pub fn declaration_for(kind: ToolKind) -> ToolDefinition {
    ToolDefinition::function(kind.name(), description(kind), parameters(kind))
}

/// The full schema published to the model, in `ToolKind::ALL` order.
pub fn build_declarations() -> Vec<ToolDefinition> {
    ToolKind::ALL.into_iter().map(declaration_for).collect()
}

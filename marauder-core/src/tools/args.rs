//! Typed arguments for each tool, decoded from the model's JSON.

use marauder_config::constants::execution;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use super::error::ToolError;
use super::kind::ToolKind;

#[derive(Debug, Deserialize)]
pub struct PathArgs {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct WriteFileArgs {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct EditFileArgs {
    pub path: String,
    pub old_str: String,
    pub new_str: String,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesArgs {
    #[serde(default = "default_list_path")]
    pub path: String,
    #[serde(default = "default_list_depth", deserialize_with = "lenient_u64")]
    pub depth: u64,
}

#[derive(Debug, Deserialize)]
pub struct CommandArgs {
    pub command: String,
}

#[derive(Debug, Deserialize)]
pub struct RunBackgroundArgs {
    pub command: String,
    #[serde(default = "default_wait_seconds", deserialize_with = "lenient_f64")]
    pub wait_seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct PidArgs {
    #[serde(deserialize_with = "lenient_pid")]
    pub pid: u32,
}

fn default_list_path() -> String {
    ".".to_owned()
}

fn default_list_depth() -> u64 {
    execution::DEFAULT_LIST_DEPTH as u64
}

fn default_wait_seconds() -> f64 {
    execution::DEFAULT_BACKGROUND_WAIT_SECS as f64
}

/// Decode `args` for `kind`, turning serde's message into an
/// `InvalidArguments` error.
pub fn parse_args<T: DeserializeOwned>(kind: ToolKind, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|err| ToolError::InvalidArguments {
        tool: kind.name().to_owned(),
        detail: err.to_string(),
    })
}

// Models regularly quote numbers; accept "42" as well as 42.

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_pid<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    number_from(&value)
        .filter(|n| n.fract() == 0.0 && *n >= 1.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32)
        .ok_or_else(|| de::Error::custom(format!("pid must be a positive integer, got {value}")))
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    number_from(&value)
        .filter(|n| *n >= 0.0)
        .map(|n| n as u64)
        .ok_or_else(|| de::Error::custom(format!("expected a non-negative number, got {value}")))
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    number_from(&value)
        .filter(|n| n.is_finite())
        .ok_or_else(|| de::Error::custom(format!("expected a number, got {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn list_files_defaults() -> Result<(), ToolError> {
        let args: ListFilesArgs = parse_args(ToolKind::ListFiles, json!({}))?;
        assert_eq!(args.path, ".");
        assert_eq!(args.depth, 2);
        Ok(())
    }

    #[test]
    fn quoted_pid_is_accepted() -> Result<(), ToolError> {
        let args: PidArgs = parse_args(ToolKind::CheckBackground, json!({"pid": "4242"}))?;
        assert_eq!(args.pid, 4242);
        Ok(())
    }

    #[test]
    fn missing_field_names_the_tool() {
        let err = parse_args::<WriteFileArgs>(ToolKind::WriteFile, json!({"path": "a.txt"}))
            .err()
            .map(|err| err.render());
        let rendered = err.unwrap_or_default();
        assert!(rendered.starts_with("Error: invalid arguments for write_file: missing field `content`"));
    }

    #[test]
    fn negative_pid_is_rejected() {
        assert!(parse_args::<PidArgs>(ToolKind::StopBackground, json!({"pid": -3})).is_err());
    }
}

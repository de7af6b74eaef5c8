use std::io;

use marauder_commons::PathEscapeError;

/// Failure of a single tool call. Rendered back to the model as
/// `Error: <message>`.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    PathEscape(#[from] PathEscapeError),

    #[error("file not found: {path}")]
    NotFound { path: String },

    /// `edit_file` found no occurrence of `old_str`.
    #[error("old_str not found in {path}")]
    EditTargetNotFound { path: String },

    #[error("old_str found {count} times in {path}, must be unique")]
    Ambiguous { path: String, count: usize },

    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    #[error("command timed out ({seconds}s limit). Use run_background for long-running processes.")]
    Timeout { seconds: u64 },

    #[error("unknown tool '{name}'")]
    UnknownTool { name: String },

    #[error("process {pid} is not tracked")]
    ProcessNotTracked { pid: u32 },

    #[error("invalid arguments for {tool}: {detail}")]
    InvalidArguments { tool: String, detail: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ToolError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Result text handed back to the model.
    pub fn render(&self) -> String {
        format!("Error: {self}")
    }
}

/// The registry could not be built.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool schema does not match dispatch table: {detail}")]
    SchemaMismatch { detail: String },

    #[error("workspace {path} is not usable: {source}")]
    Workspace {
        path: String,
        #[source]
        source: io::Error,
    },
}

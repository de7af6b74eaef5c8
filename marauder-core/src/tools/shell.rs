use std::path::Path;

use marauder_bash_runner::{DEFAULT_OUTPUT_LIMIT_CHARS, ShellError, ShellExecutor};
use tracing::debug;

use super::error::ToolError;

/// `run_command`: one-shot shell execution in the workspace.
#[derive(Debug, Clone)]
pub struct ShellTool {
    executor: ShellExecutor,
}

impl ShellTool {
    pub fn new(working_dir: &Path) -> Self {
        Self {
            executor: ShellExecutor::new(working_dir),
        }
    }

    pub fn with_executor(executor: ShellExecutor) -> Self {
        Self { executor }
    }

    pub async fn run(&self, command: &str) -> Result<String, ToolError> {
        match self.executor.run(command).await {
            Ok(output) => {
                debug!(command, exit_code = ?output.exit_code, "command finished");
                Ok(output.render(DEFAULT_OUTPUT_LIMIT_CHARS))
            }
            Err(ShellError::Timeout { seconds }) => Err(ToolError::Timeout { seconds }),
            Err(ShellError::Spawn { command, source }) => {
                Err(ToolError::io(format!("failed to spawn `{command}`"), source))
            }
            Err(ShellError::Wait { command, source }) => {
                Err(ToolError::io(format!("failed to wait for `{command}`"), source))
            }
        }
    }
}

use std::path::Path;
use std::sync::Arc;

use hashbrown::HashMap;
use serde_json::Value;
use tracing::{debug, warn};

use super::args::{
    CommandArgs, EditFileArgs, ListFilesArgs, PathArgs, PidArgs, RunBackgroundArgs,
    WriteFileArgs, parse_args,
};
use super::background::BackgroundTools;
use super::declarations::build_declarations;
use super::error::{RegistryError, ToolError};
use super::file_ops::FileOps;
use super::kind::ToolKind;
use super::shell::ShellTool;
use crate::llm::ToolDefinition;

/// Name → handler table for one workspace.
///
/// Construction fails if the published schema and [`ToolKind`] disagree, so
/// a call the model was told about can always be dispatched.
pub struct ToolRegistry {
    files: FileOps,
    shell: ShellTool,
    background: BackgroundTools,
    declarations: Arc<Vec<ToolDefinition>>,
    dispatch: HashMap<String, ToolKind>,
}

impl ToolRegistry {
    pub fn new(workspace: &Path) -> Result<Self, RegistryError> {
        let files = FileOps::new(workspace).map_err(|source| RegistryError::Workspace {
            path: workspace.display().to_string(),
            source,
        })?;
        let root = files.root().to_path_buf();
        let declarations = build_declarations();
        let dispatch = validate_declarations(&declarations)?;
        debug!(workspace = %root.display(), tools = dispatch.len(), "tool registry ready");

        Ok(Self {
            shell: ShellTool::new(&root),
            background: BackgroundTools::new(&root),
            files,
            declarations: Arc::new(declarations),
            dispatch,
        })
    }

    pub fn workspace(&self) -> &Path {
        self.files.root()
    }

    /// Schema sent with every request.
    pub fn declarations(&self) -> Arc<Vec<ToolDefinition>> {
        Arc::clone(&self.declarations)
    }

    pub fn background(&self) -> &BackgroundTools {
        &self.background
    }

    /// Run one call and return the text the model sees. Never fails: every
    /// error is rendered as `Error: ...`.
    pub async fn execute(&self, name: &str, raw_args: &str) -> String {
        let Some(kind) = self.dispatch.get(name).copied() else {
            warn!(tool = %name, "model called an unknown tool");
            return ToolError::UnknownTool {
                name: name.to_owned(),
            }
            .render();
        };

        let outcome = match parse_raw_args(kind, raw_args) {
            Ok(args) => self.execute_kind(kind, args).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(text) => text,
            Err(err) => {
                debug!(tool = %name, error = %err, "tool call failed");
                err.render()
            }
        }
    }

    pub async fn execute_kind(&self, kind: ToolKind, args: Value) -> Result<String, ToolError> {
        match kind {
            ToolKind::ReadFile => {
                let args: PathArgs = parse_args(kind, args)?;
                self.files.read_file(&args.path).await
            }
            ToolKind::WriteFile => {
                let args: WriteFileArgs = parse_args(kind, args)?;
                self.files.write_file(&args.path, &args.content).await
            }
            ToolKind::EditFile => {
                let args: EditFileArgs = parse_args(kind, args)?;
                self.files
                    .edit_file(&args.path, &args.old_str, &args.new_str)
                    .await
            }
            ToolKind::ListFiles => {
                let args: ListFilesArgs = parse_args(kind, args)?;
                let depth = usize::try_from(args.depth).unwrap_or(usize::MAX);
                let files = self.files.clone();
                tokio::task::spawn_blocking(move || files.list_files(&args.path, depth))
                    .await
                    .map_err(|err| ToolError::io("list_files task failed", err.into()))?
            }
            ToolKind::RunCommand => {
                let args: CommandArgs = parse_args(kind, args)?;
                self.shell.run(&args.command).await
            }
            ToolKind::RunBackground => {
                let args: RunBackgroundArgs = parse_args(kind, args)?;
                self.background.run(&args.command, args.wait_seconds).await
            }
            ToolKind::CheckBackground => {
                let args: PidArgs = parse_args(kind, args)?;
                self.background.check(args.pid)
            }
            ToolKind::StopBackground => {
                let args: PidArgs = parse_args(kind, args)?;
                self.background.stop(args.pid).await
            }
            ToolKind::ListBackground => Ok(self.background.list()),
        }
    }

    /// Stop every background process. Called at session teardown.
    pub async fn shutdown(&self) {
        self.background.shutdown().await;
    }
}

/// Models occasionally send an empty string for tools without parameters.
fn parse_raw_args(kind: ToolKind, raw_args: &str) -> Result<Value, ToolError> {
    if raw_args.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw_args).map_err(|err| ToolError::InvalidArguments {
        tool: kind.name().to_owned(),
        detail: err.to_string(),
    })
}

/// Every declared name must map to exactly one `ToolKind`, and every kind
/// must be declared exactly once.
pub fn validate_declarations(
    declarations: &[ToolDefinition],
) -> Result<HashMap<String, ToolKind>, RegistryError> {
    let mut dispatch = HashMap::with_capacity(declarations.len());
    for declaration in declarations {
        let name = declaration.name();
        let kind = ToolKind::from_name(name).ok_or_else(|| RegistryError::SchemaMismatch {
            detail: format!("declared tool '{name}' has no handler"),
        })?;
        if dispatch.insert(name.to_owned(), kind).is_some() {
            return Err(RegistryError::SchemaMismatch {
                detail: format!("tool '{name}' is declared twice"),
            });
        }
    }

    if let Some(missing) = ToolKind::ALL
        .into_iter()
        .find(|kind| !dispatch.contains_key(kind.name()))
    {
        return Err(RegistryError::SchemaMismatch {
            detail: format!("tool '{missing}' is not declared"),
        });
    }
    Ok(dispatch)
}

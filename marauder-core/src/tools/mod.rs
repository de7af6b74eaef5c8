//! The tool surface exposed to the model.
//!
//! Every tool is a [`ToolKind`] variant. [`ToolRegistry`] owns the workspace
//! handles (file operations, shell, background supervisor), publishes the
//! JSON schema built from the same enum, and turns every call into result
//! text: failures come back as `Error: ...` strings, never as panics.

pub mod args;
pub mod background;
pub mod declarations;
pub mod error;
pub mod file_ops;
pub mod kind;
pub mod labels;
pub mod registry;
pub mod shell;

pub use background::BackgroundTools;
pub use declarations::build_declarations;
pub use error::{RegistryError, ToolError};
pub use file_ops::FileOps;
pub use kind::ToolKind;
pub use labels::{short_action, tool_call_summary, touched_path};
pub use registry::ToolRegistry;

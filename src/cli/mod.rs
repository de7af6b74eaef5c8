//! Command-line surface: argument parsing, connection setup and workspace
//! selection.

mod args;
mod setup;
mod workspace;

pub use args::{Cli, ViewMode};
pub use setup::load_connection_config;
pub use workspace::{resolve_workspace, validate_workspace};

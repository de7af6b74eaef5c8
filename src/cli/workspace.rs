use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Input};

/// Pick the session's working directory.
///
/// An explicit path must exist. Without one, interactive runs ask whether
/// the current directory should be used and otherwise ask for a path.
pub fn resolve_workspace(requested: Option<&Path>, interactive: bool) -> Result<PathBuf> {
    if let Some(path) = requested {
        return validate_workspace(path);
    }

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    if !interactive {
        return validate_workspace(&cwd);
    }

    let use_cwd = Confirm::new()
        .with_prompt(format!("Use current directory as workspace? ({})", cwd.display()))
        .default(true)
        .interact()?;
    if use_cwd {
        return validate_workspace(&cwd);
    }

    let entered: String = Input::new()
        .with_prompt("Workspace path")
        .interact_text()?;
    validate_workspace(Path::new(entered.trim()))
}

/// The canonical form of `path`, which must be an existing directory.
pub fn validate_workspace(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        bail!("Workspace path {} does not exist", path.display());
    }
    if !path.is_dir() {
        bail!("Workspace path {} is not a directory", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("Failed to resolve workspace path {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[test]
    fn missing_workspace_is_rejected() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = validate_workspace(&missing).unwrap_err();
        assert!(err.to_string().contains("does not exist"), "{err}");
    }

    #[test]
    fn file_is_not_a_workspace() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("notes.txt");
        file.write_str("x").unwrap();
        let err = validate_workspace(file.path()).unwrap_err();
        assert!(err.to_string().contains("is not a directory"), "{err}");
    }

    #[test]
    fn workspace_is_canonicalized() {
        let dir = TempDir::new().unwrap();
        dir.child("sub").create_dir_all().unwrap();
        let dotted = dir.path().join("sub").join("..").join("sub");

        let resolved = validate_workspace(&dotted).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, dir.path().join("sub").canonicalize().unwrap());
    }

    #[test]
    fn explicit_path_skips_prompts() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_workspace(Some(dir.path()), true).unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap());
    }
}

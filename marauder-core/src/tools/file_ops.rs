//! Sandboxed file operations rooted at the session workspace.
//!
//! Every path goes through two checks before any read or write: a lexical
//! containment check on the normalized path, then a symlink check on the
//! real location, following dangling links as well.

use std::io;
use std::path::{Path, PathBuf};

use marauder_commons::{confine_to_root, ensure_resolved_within};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::error::ToolError;
use crate::utils::text::char_len;

/// Directory names never shown by `list_files`.
const LIST_SKIP: &[&str] = &[".git", "node_modules", "__pycache__", ".venv", "venv", ".env"];

#[derive(Debug, Clone)]
pub struct FileOps {
    root: PathBuf,
}

impl FileOps {
    /// `root` is canonicalized once here; it must exist.
    pub fn new(root: &Path) -> io::Result<Self> {
        Ok(Self {
            root: root.canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a user path onto the workspace or fail with `PathEscape`.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, ToolError> {
        let resolved = confine_to_root(&self.root, path)?;
        ensure_resolved_within(&self.root, &resolved, path)?;
        Ok(resolved)
    }

    pub async fn read_file(&self, path: &str) -> Result<String, ToolError> {
        let full = self.resolve(path)?;
        if !is_file(&full).await {
            return Err(ToolError::NotFound {
                path: path.to_owned(),
            });
        }

        let bytes = tokio::fs::read(&full)
            .await
            .map_err(|err| ToolError::io(format!("failed to read {path}"), err))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn write_file(&self, path: &str, content: &str) -> Result<String, ToolError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| ToolError::io(format!("failed to create parent of {path}"), err))?;
        }

        tokio::fs::write(&full, content)
            .await
            .map_err(|err| ToolError::io(format!("failed to write {path}"), err))?;
        debug!(path = %full.display(), bytes = content.len(), "wrote file");
        Ok(format!("Wrote {} chars to {path}", char_len(content)))
    }

    /// Replace the single occurrence of `old_str`. Zero or several
    /// occurrences leave the file untouched.
    pub async fn edit_file(
        &self,
        path: &str,
        old_str: &str,
        new_str: &str,
    ) -> Result<String, ToolError> {
        let full = self.resolve(path)?;
        if !is_file(&full).await {
            return Err(ToolError::NotFound {
                path: path.to_owned(),
            });
        }

        let text = tokio::fs::read_to_string(&full)
            .await
            .map_err(|err| ToolError::io(format!("failed to read {path}"), err))?;

        match text.matches(old_str).count() {
            0 => Err(ToolError::EditTargetNotFound {
                path: path.to_owned(),
            }),
            1 => {
                let updated = text.replacen(old_str, new_str, 1);
                tokio::fs::write(&full, updated)
                    .await
                    .map_err(|err| ToolError::io(format!("failed to write {path}"), err))?;
                Ok(format!("Edited {path}"))
            }
            count => Err(ToolError::Ambiguous {
                path: path.to_owned(),
                count,
            }),
        }
    }

    /// Indented tree of `path`, `depth + 1` levels deep.
    pub fn list_files(&self, path: &str, depth: usize) -> Result<String, ToolError> {
        let full = self.resolve(path)?;
        if !full.is_dir() {
            return Err(ToolError::NotADirectory {
                path: path.to_owned(),
            });
        }

        let walker = WalkDir::new(&full)
            .max_depth(depth.saturating_add(1))
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || entry
                        .file_name()
                        .to_str()
                        .is_none_or(|name| !LIST_SKIP.contains(&name))
            });

        let mut lines = Vec::new();
        for item in walker {
            match item {
                Ok(entry) if entry.depth() == 0 => {}
                Ok(entry) => {
                    let indent = "  ".repeat(entry.depth() - 1);
                    let name = entry.file_name().to_string_lossy();
                    if entry.file_type().is_dir() {
                        lines.push(format!("{indent}{name}/"));
                    } else {
                        lines.push(format!("{indent}{name}"));
                    }
                }
                Err(err) => {
                    let denied = err
                        .io_error()
                        .is_some_and(|io| io.kind() == io::ErrorKind::PermissionDenied);
                    if denied {
                        lines.push(format!("{}(permission denied)", "  ".repeat(err.depth())));
                    } else {
                        warn!(error = %err, "skipping unreadable entry while listing");
                    }
                }
            }
        }

        if lines.is_empty() {
            return Ok("(empty directory)".to_owned());
        }
        Ok(lines.join("\n"))
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn workspace() -> io::Result<(TempDir, FileOps)> {
        let dir = TempDir::new()?;
        let ops = FileOps::new(dir.path())?;
        Ok((dir, ops))
    }

    #[tokio::test]
    async fn write_then_read() -> TestResult {
        let (_dir, ops) = workspace()?;
        assert_eq!(ops.write_file("a.txt", "hi").await?, "Wrote 2 chars to a.txt");
        assert_eq!(ops.read_file("a.txt").await?, "hi");
        Ok(())
    }

    #[tokio::test]
    async fn write_creates_parents() -> TestResult {
        let (dir, ops) = workspace()?;
        ops.write_file("src/deep/mod.rs", "fn main() {}").await?;
        assert!(dir.path().join("src/deep/mod.rs").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn escapes_are_rejected_before_io() -> TestResult {
        let (dir, ops) = workspace()?;
        let outside = dir.path().with_extension("outside");

        let write = ops.write_file("../outside.txt", "x").await;
        assert!(matches!(write, Err(ToolError::PathEscape(_))));
        assert!(!dir.path().parent().map(|p| p.join("outside.txt").exists()).unwrap_or(false));

        let absolute = ops.read_file(&outside.to_string_lossy()).await;
        assert!(matches!(absolute, Err(ToolError::PathEscape(_))));
        assert!(matches!(
            ops.list_files("../..", 1),
            Err(ToolError::PathEscape(_))
        ));
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_out_of_workspace_is_rejected() -> TestResult {
        let (dir, ops) = workspace()?;
        let outside = TempDir::new()?;
        fs::write(outside.path().join("secret.txt"), "s")?;
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link"))?;

        let result = ops.read_file("link/secret.txt").await;
        assert!(matches!(result, Err(ToolError::PathEscape(_))));
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn write_through_dangling_symlink_is_rejected() -> TestResult {
        let (dir, ops) = workspace()?;
        let outside = TempDir::new()?;
        let target = outside.path().join("pwned.txt");
        std::os::unix::fs::symlink(&target, dir.path().join("link"))?;

        let result = ops.write_file("link", "owned").await;
        assert!(matches!(result, Err(ToolError::PathEscape(_))));
        assert!(!target.exists());
        Ok(())
    }

    #[tokio::test]
    async fn read_missing_file() -> TestResult {
        let (_dir, ops) = workspace()?;
        let err = ops.read_file("nope.txt").await.err().ok_or("expected error")?;
        assert_eq!(err.render(), "Error: file not found: nope.txt");
        Ok(())
    }

    #[tokio::test]
    async fn read_replaces_invalid_utf8() -> TestResult {
        let (dir, ops) = workspace()?;
        fs::write(dir.path().join("bin.dat"), [b'o', b'k', 0xff])?;
        assert_eq!(ops.read_file("bin.dat").await?, "ok\u{fffd}");
        Ok(())
    }

    #[tokio::test]
    async fn edit_requires_exactly_one_match() -> TestResult {
        let (dir, ops) = workspace()?;
        fs::write(dir.path().join("f.txt"), "alpha beta alpha")?;

        let missing = ops.edit_file("f.txt", "gamma", "x").await;
        assert!(matches!(missing, Err(ToolError::EditTargetNotFound { .. })));

        let twice = ops.edit_file("f.txt", "alpha", "x").await;
        assert!(matches!(twice, Err(ToolError::Ambiguous { count: 2, .. })));
        assert_eq!(fs::read_to_string(dir.path().join("f.txt"))?, "alpha beta alpha");

        assert_eq!(ops.edit_file("f.txt", "beta", "BETA").await?, "Edited f.txt");
        assert_eq!(fs::read_to_string(dir.path().join("f.txt"))?, "alpha BETA alpha");
        Ok(())
    }

    #[tokio::test]
    async fn edit_missing_file() -> TestResult {
        let (_dir, ops) = workspace()?;
        let result = ops.edit_file("ghost.rs", "a", "b").await;
        assert!(matches!(result, Err(ToolError::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn list_renders_sorted_tree_and_skips_noise() -> TestResult {
        let (dir, ops) = workspace()?;
        fs::create_dir_all(dir.path().join("src/bin"))?;
        fs::create_dir_all(dir.path().join("node_modules/pkg"))?;
        fs::create_dir_all(dir.path().join(".git"))?;
        fs::write(dir.path().join("src/main.rs"), "")?;
        fs::write(dir.path().join("src/bin/tool.rs"), "")?;
        fs::write(dir.path().join("Cargo.toml"), "")?;

        assert_eq!(
            ops.list_files(".", 2)?,
            "Cargo.toml\nsrc/\n  bin/\n    tool.rs\n  main.rs"
        );
        assert_eq!(ops.list_files(".", 0)?, "Cargo.toml\nsrc/");
        Ok(())
    }

    #[test]
    fn list_edge_cases() -> TestResult {
        let (dir, ops) = workspace()?;
        fs::create_dir(dir.path().join("empty"))?;
        fs::write(dir.path().join("file.txt"), "")?;

        assert_eq!(ops.list_files("empty", 2)?, "(empty directory)");
        let err = ops.list_files("file.txt", 2).err().ok_or("expected error")?;
        assert_eq!(err.render(), "Error: not a directory: file.txt");
        Ok(())
    }
}

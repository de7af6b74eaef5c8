use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// A requested path resolved to a location outside the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Path escapes working directory: {requested}")]
pub struct PathEscapeError {
    pub requested: String,
}

/// Normalize a path by resolving `.` and `..` components lexically.
///
/// `..` at the filesystem root is dropped, so the result of normalizing an
/// absolute path is always absolute.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Resolve `user_path` against `root` and reject anything that leaves it.
///
/// Purely lexical: no filesystem call is made, so the check can run before
/// any I/O. Containment is component-wise (`/work2` is not inside `/work`).
pub fn confine_to_root(root: &Path, user_path: &str) -> Result<PathBuf, PathEscapeError> {
    let requested = Path::new(user_path);
    let joined = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        root.join(requested)
    };

    let resolved = normalize_path(&joined);
    if resolved.starts_with(normalize_path(root)) {
        Ok(resolved)
    } else {
        Err(PathEscapeError {
            requested: user_path.to_owned(),
        })
    }
}

/// Follow symlinks on the deepest existing ancestor of `resolved` and make
/// sure the real location is still under `canonical_root`.
///
/// Call after [`confine_to_root`]. Paths that do not exist yet (a file about
/// to be written) are judged by their nearest existing parent. A dangling
/// symlink is judged by where it points, and a path that cannot be resolved
/// at all is rejected.
pub fn ensure_resolved_within(
    canonical_root: &Path,
    resolved: &Path,
    requested: &str,
) -> Result<(), PathEscapeError> {
    let escape = || PathEscapeError {
        requested: requested.to_owned(),
    };

    let real = match real_location(resolved, MAX_SYMLINK_HOPS) {
        Ok(real) => real,
        Err(error) => {
            warn!(path = %resolved.display(), %error, "unable to resolve path");
            return Err(escape());
        }
    };

    if real.starts_with(canonical_root) {
        Ok(())
    } else {
        Err(escape())
    }
}

const MAX_SYMLINK_HOPS: usize = 40;

/// Canonicalize the deepest existing ancestor and re-append the missing tail.
/// Dangling symlinks met on the way are followed by hand, since
/// `canonicalize` reports them as missing while writes still go through them.
fn real_location(path: &Path, hops_left: usize) -> io::Result<PathBuf> {
    let mut suffix = Vec::new();
    let mut current = path;

    loop {
        match std::fs::canonicalize(current) {
            Ok(mut real) => {
                real.extend(suffix.iter().rev());
                return Ok(real);
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                let is_link = std::fs::symlink_metadata(current)
                    .map(|meta| meta.file_type().is_symlink())
                    .unwrap_or(false);
                if is_link {
                    if hops_left == 0 {
                        return Err(io::Error::other("too many levels of symbolic links"));
                    }
                    let target = std::fs::read_link(current)?;
                    let base = match current.parent() {
                        Some(parent) => std::fs::canonicalize(parent)?,
                        None => PathBuf::new(),
                    };
                    let mut next = normalize_path(&base.join(target));
                    next.extend(suffix.iter().rev());
                    return real_location(&next, hops_left - 1);
                }

                let Some(name) = current.file_name() else {
                    return Err(error);
                };
                suffix.push(name.to_os_string());
                current = match current.parent() {
                    Some(parent) => parent,
                    None => return Err(error),
                };
            }
            Err(error) => return Err(error),
        }
    }
}

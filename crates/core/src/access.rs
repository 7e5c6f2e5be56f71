//! Path containment checks for the allowed repository roots
//!
//! Every file-touching operation consults [`is_path_allowed`] before doing
//! any I/O. Containment is decided on absolute, lexically normalized paths
//! and compared component-wise, so a root of `/data/repo` never admits
//! `/data/repo-evil/secrets` the way a plain string-prefix test would.
//! Symlinks are not resolved; a symlink inside a root that points outside
//! it is not detected.

use crate::error::Result;
use std::path::{Component, Path, PathBuf};

/// Resolve a path to its absolute, lexically normalized form.
///
/// Relative paths are joined onto the current working directory. `.`
/// components are dropped and `..` components pop their parent without
/// touching the filesystem.
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    Ok(normalized)
}

/// Returns true when `path` lies within at least one of the allowed roots.
///
/// A root validates itself. Paths that cannot be resolved (the current
/// working directory is gone) are rejected rather than guessed at.
pub fn is_path_allowed(path: &Path, allowed_roots: &[PathBuf]) -> bool {
    let Ok(candidate) = normalize_path(path) else {
        return false;
    };

    allowed_roots.iter().any(|root| match normalize_path(root) {
        Ok(normalized_root) => candidate.starts_with(&normalized_root),
        Err(_) => false,
    })
}

//! Resolve manifest names to local paths without ever leaving the install root.

use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("absolute paths are not allowed: {0:?}")]
    Absolute(String),
    #[error("parent traversal not allowed: {0:?}")]
    ParentTraversal(String),
    #[error("path escapes root: {0:?}")]
    EscapesRoot(String),
}

/// Join `name` onto `root`, rejecting anything that could resolve outside `root`.
///
/// The lexical check rejects absolute names and `..` segments. When the target
/// exists, the canonical path must also stay under the canonical root, which
/// catches symlinks pointing elsewhere. A target that does not exist is returned
/// as joined; hashing it will fail on its own.
pub fn resolve_entry_path(root: &Path, name: &str) -> Result<PathBuf, PathError> {
    let rel = Path::new(name);
    for comp in rel.components() {
        match comp {
            Component::Prefix(_) | Component::RootDir => {
                return Err(PathError::Absolute(name.to_string()))
            }
            Component::ParentDir => return Err(PathError::ParentTraversal(name.to_string())),
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    let candidate = root.join(rel);
    let (Ok(root_can), Ok(cand_can)) = (root.canonicalize(), candidate.canonicalize()) else {
        return Ok(candidate);
    };
    if !cand_can.starts_with(&root_can) {
        return Err(PathError::EscapesRoot(name.to_string()));
    }
    Ok(candidate)
}

//! Filesystem primitives: move, remove, copy trees

use crate::error::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// True for files, directories and dangling symlinks alike
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Remove a file, symlink or whole directory tree
pub fn remove_path(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| Error::io("inspect", path, e))?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| Error::io("remove", path, e))
}

/// Move a file or directory, creating the destination's parents.
/// Refuses to overwrite an existing destination.
pub fn move_path(from: &Path, to: &Path) -> Result<()> {
    if exists(to) {
        return Err(Error::io(
            "move onto",
            to,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "destination exists"),
        ));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io("create directory", parent, e))?;
    }

    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    // rename fails across filesystems; fall back to copy + delete
    if fs::metadata(from).map_err(|e| Error::io("inspect", from, e))?.is_dir() {
        copy_tree(from, to)?;
    } else {
        fs::copy(from, to).map_err(|e| Error::io("copy", from, e))?;
    }
    remove_path(from)
}

/// Recursively copy `from` into `to`, skipping `.git`.
/// Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    let walker = WalkDir::new(from)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| Error::io("walk", from, e.into()))?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io("create directory", &target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io("create directory", parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| Error::io("copy", entry.path(), e))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Resolve `.` and `..` without touching the filesystem, so paths through a
/// directory that no longer exists still name their real target
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

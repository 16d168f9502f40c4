//! File selector resolution
//!
//! Selectors are globs relative to the project root. Dependency directories
//! are never descended into, whatever the selector says.

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names that hold third-party code
pub const IGNORED_DIRS: &[&str] = &["node_modules", "vendor", "packages"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled set of file selectors
#[derive(Debug, Clone)]
pub struct FileSelector {
    patterns: Vec<Pattern>,
}

impl FileSelector {
    pub fn new<S: AsRef<str>>(selectors: &[S]) -> Result<Self> {
        let patterns = selectors
            .iter()
            .map(|s| {
                let selector = s.as_ref().trim_start_matches("./");
                Pattern::new(selector).map_err(|source| Error::InvalidSelector {
                    selector: s.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// True when the root-relative, `/`-separated path matches any selector
    pub fn matches(&self, relative: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(relative, MATCH_OPTIONS))
    }

    /// Every regular file under `root` the selectors match, sorted.
    /// A selector matching nothing is not an error.
    pub fn resolve(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut matched = Vec::new();

        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_ignored_dir(entry));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                Error::io("walk", path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(relative) = relative_slash_path(root, entry.path()) {
                if self.matches(&relative) {
                    matched.push(entry.into_path());
                }
            }
        }

        matched.sort();
        Ok(matched)
    }
}

fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// True when the selector contains glob metacharacters
pub fn is_glob(selector: &str) -> bool {
    selector.contains(['*', '?', '['])
}

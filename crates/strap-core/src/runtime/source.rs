//! Boilerplate sources: a git remote or a local directory

use super::process;
use crate::error::{Error, Result};
use crate::fsops;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Where a boilerplate is fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    /// Cloned with `git`
    Remote(Url),
    /// Copied as is; used for development and tests
    Local(PathBuf),
}

impl RepoSource {
    /// An existing directory wins over URL parsing
    pub fn parse(location: &str) -> Result<Self> {
        let path = Path::new(location);
        if path.is_dir() {
            return Ok(Self::Local(path.to_path_buf()));
        }
        Url::parse(location)
            .map(Self::Remote)
            .map_err(|e| Error::InvalidSource {
                location: location.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Materialize the boilerplate at `dest`, which must not exist yet.
    ///
    /// Remote clones are bounded by `limit`; `branch` selects a branch or tag.
    pub async fn fetch(&self, dest: &Path, branch: Option<&str>, limit: Duration) -> Result<()> {
        match self {
            Self::Remote(url) => {
                let dest_str = dest.to_string_lossy();
                let mut args = vec!["clone"];
                if let Some(branch) = branch {
                    args.extend(["-b", branch]);
                }
                args.extend([url.as_str(), &*dest_str]);
                process::run("git", &args, None, Some(limit)).await?;
                Ok(())
            }
            Self::Local(path) => {
                if branch.is_some() {
                    tracing::warn!("branch selection is ignored for local sources");
                }
                let from = path.clone();
                let to = dest.to_path_buf();
                let copied = tokio::task::spawn_blocking(move || fsops::copy_tree(&from, &to))
                    .await
                    .map_err(|e| Error::io("copy", path, std::io::Error::other(e)))??;
                tracing::debug!(files = copied, from = %path.display(), "copied local boilerplate");
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for RepoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{}", url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

//! Dependency installation

use super::process;
use super::tools::Tool;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Dependency installers a recipe can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// Front-end build tooling, installed with yarn
    Webpack,
    /// PHP dependencies
    Composer,
}

impl PackageManager {
    pub fn tool(&self) -> Tool {
        match self {
            PackageManager::Webpack => Tool::Yarn,
            PackageManager::Composer => Tool::Composer,
        }
    }

    pub fn args(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Webpack => &["install"],
            PackageManager::Composer => &["install", "--ignore-platform-reqs"],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManager::Webpack => "Webpack",
            PackageManager::Composer => "Composer",
        }
    }

    /// Install dependencies in `dir`. Not time-limited.
    pub async fn install(&self, dir: &Path) -> Result<()> {
        process::run(self.tool().binary(), self.args(), Some(dir), None).await?;
        Ok(())
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

//! Detection of the external tools a run depends on

use anyhow::Result;
use std::fmt;
use std::process::Command;

/// External programs the workflow shells out to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    Git,
    Yarn,
    Composer,
}

impl Tool {
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Git => "git",
            Tool::Yarn => "yarn",
            Tool::Composer => "composer",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Git => "Git",
            Tool::Yarn => "Yarn",
            Tool::Composer => "Composer",
        }
    }

    fn install_hint(&self) -> &'static str {
        match self {
            Tool::Git => "install from https://git-scm.com",
            Tool::Yarn => "install from https://yarnpkg.com",
            Tool::Composer => "install from https://getcomposer.org",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub tool: Tool,
    pub version: Option<String>,
    pub available: bool,
}

/// Check whether `tool` answers `--version`
pub fn check_tool(tool: Tool) -> ToolInfo {
    let output = Command::new(tool.binary()).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            ToolInfo {
                tool,
                version: Some(version),
                available: true,
            }
        }
        _ => ToolInfo {
            tool,
            version: None,
            available: false,
        },
    }
}

/// Check every tool, failing with one message listing all missing ones
pub fn check_tools(tools: &[Tool]) -> Result<Vec<ToolInfo>> {
    let results: Vec<ToolInfo> = tools.iter().map(|t| check_tool(*t)).collect();

    let missing: Vec<String> = results
        .iter()
        .filter(|info| !info.available)
        .map(|info| format!("  - {} ({})", info.tool, info.tool.install_hint()))
        .collect();

    if !missing.is_empty() {
        anyhow::bail!("Missing required tools:\n{}", missing.join("\n"));
    }

    for info in &results {
        tracing::debug!(tool = %info.tool, version = ?info.version, "found");
    }
    Ok(results)
}

//! Version comparison between the CLI and a recipe

use crate::error::{Error, Result};
use semver::Version;

/// Compare the running CLI against the oldest version a recipe supports.
/// Returns a warning when the CLI is older; unparseable versions are not compared.
pub fn check_compatibility(
    cli_version: &str,
    min_cli_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli = parse_version(cli_version).ok()?;
    let required = parse_version(min_cli_version).ok()?;

    if cli < required {
        Some(format!(
            "This recipe was written for wp-strap {} or newer.\n\
             You are running version {}.\n\
             Consider updating: {}",
            required, cli, upgrade_command
        ))
    } else {
        None
    }
}

/// Parse a version string, tolerating a leading `v`
pub fn parse_version(version_str: &str) -> Result<Version> {
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned)
        .map_err(|e| Error::Recipe(format!("invalid version '{}': {}", version_str, e)))
}

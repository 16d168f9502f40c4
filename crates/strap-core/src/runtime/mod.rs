//! External side of a run
//!
//! This module provides:
//! - Fetching the boilerplate (git clone or local copy)
//! - Dependency installation with yarn and composer
//! - Detection of the tools those steps need

pub mod install;
pub mod process;
pub mod source;
pub mod tools;

pub use install::PackageManager;
pub use source::RepoSource;
pub use tools::{check_tool, check_tools, Tool, ToolInfo};

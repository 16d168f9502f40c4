//! Strap Core - turn a cloned WordPress boilerplate into a named project
//!
//! A boilerplate ships with placeholder identities (`The Plugin Name`,
//! `ThePluginName\`, `_THE_PLUGIN_NAME_`, ...). This library asks for the
//! real ones, derives the rest, and rewrites the clone: ordered search and
//! replace, removal of unwanted optional features, manifest patching and
//! file moves. Around that it runs the clone, install and cleanup tasks.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Engine** - answers, question schema and derivation, the
//!   template pipeline (`template`), filesystem primitives
//! - **Layer 2: Recipes and workflow** - YAML recipes describing each
//!   boilerplate, and the task runner that executes them (`workflow`)
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use strap_core::{workflow, AnswerSet, Boilerplate, LogReporter, RunOptions};
//!
//! let recipe = Boilerplate::Plugin.recipe()?;
//! let answers: AnswerSet = [("projectName", "Cool Plugin"), ("package", "cool-plugin")]
//!     .into_iter()
//!     .collect();
//! let options = RunOptions::for_recipe(&recipe, std::env::current_dir()?)?;
//! workflow::run(&recipe, &answers, &options, &mut LogReporter).await?;
//! ```

pub mod answers;
pub mod error;
pub mod fsops;
pub mod prompt;
pub mod recipe;
pub mod runtime;
pub mod schema;
pub mod template;
pub mod workflow;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use answers::{AnswerSet, Prefill};
pub use error::{Error, Result};
pub use prompt::{collect_answers, Prompter, EXIT_SENTINEL};
pub use recipe::{Boilerplate, Recipe};
pub use runtime::{PackageManager, RepoSource, Tool};
pub use schema::{FieldSpec, QuestionKind, QuestionSchema, Transform};
pub use template::{run_steps, Feature, Step, TemplateReport};
pub use workflow::{LogReporter, Outcome, Reporter, RunOptions, Task};

#[cfg(feature = "tui")]
pub use tui::{run, CreateArgs};

//! Boilerplate recipes
//!
//! A recipe is the data half of a boilerplate: where to clone it from, what
//! to ask, which features it has, how to rewrite it, and which tasks to run.
//! The two WP-Strap boilerplates ship built in; any recipe can be swapped for
//! a YAML file at run time.

pub mod version;

use crate::error::{Error, Result};
use crate::schema::QuestionSchema;
use crate::template::{Condition, Feature, Step};
use crate::workflow::Task;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub use version::check_compatibility;

/// Default wait for cloning the boilerplate
pub const DEFAULT_CLONE_TIMEOUT_SECS: u64 = 45;

fn default_clone_timeout() -> u64 {
    DEFAULT_CLONE_TIMEOUT_SECS
}

fn default_directory_field() -> String {
    "package".to_string()
}

fn default_cleanup() -> Vec<String> {
    vec![".git".to_string(), ".github".to_string(), ".gitattributes".to_string()]
}

/// Complete description of one boilerplate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Display name
    pub name: String,

    pub description: String,

    /// Git URL or local directory of the boilerplate
    pub repository: String,

    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default = "default_clone_timeout")]
    pub clone_timeout_secs: u64,

    /// Oldest CLI version that understands this recipe
    #[serde(default)]
    pub min_cli_version: Option<String>,

    /// Answer naming the project folder
    #[serde(default = "default_directory_field")]
    pub directory_field: String,

    pub questions: QuestionSchema,

    #[serde(default)]
    pub features: Vec<Feature>,

    /// Template stage, applied in order
    pub steps: Vec<Step>,

    /// Workflow tasks, run in order
    pub workflow: Vec<Task>,

    /// Version-control leftovers removed at the end
    #[serde(default = "default_cleanup")]
    pub cleanup: Vec<String>,

    #[serde(default)]
    pub docs_url: Option<String>,

    /// Lines shown after a successful run; may reference answers
    #[serde(default)]
    pub next_steps: Vec<String>,
}

impl Recipe {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let recipe: Recipe = serde_yaml::from_str(content)?;
        recipe.validate()?;
        Ok(recipe)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read", path, e))?;
        Self::from_yaml(&content)
    }

    /// Catch recipe mistakes before anything is cloned: dangling names,
    /// uncompilable patterns, a workflow without clone/template.
    pub fn validate(&self) -> Result<()> {
        self.questions.validate()?;
        if let Some(min) = &self.min_cli_version {
            version::parse_version(min)?;
        }

        let fields: HashSet<&str> = self
            .questions
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        let features: HashSet<&str> = self.features.iter().map(|f| f.name.as_str()).collect();

        if !fields.contains(self.directory_field.as_str()) {
            return Err(Error::Recipe(format!(
                "directory field `{}` is not a question",
                self.directory_field
            )));
        }

        for feature in &self.features {
            if !fields.contains(feature.field()) {
                return Err(Error::Recipe(format!(
                    "feature `{}` reads unknown field `{}`",
                    feature.name,
                    feature.field()
                )));
            }
        }

        let check_condition = |cond: &Condition| -> Result<()> {
            for name in cond.features() {
                if !features.contains(name.as_str()) {
                    return Err(Error::Recipe(format!("unknown feature `{}` in condition", name)));
                }
            }
            for name in cond.requires.iter().chain(cond.equals.keys()) {
                if !fields.contains(name.as_str()) {
                    return Err(Error::Recipe(format!("unknown field `{}` in condition", name)));
                }
            }
            Ok(())
        };
        let check_template = |text: &str| -> Result<()> {
            for name in referenced_fields(text) {
                if name != "year" && !fields.contains(name) {
                    return Err(Error::UnknownField(name.to_string()));
                }
            }
            Ok(())
        };

        for step in &self.steps {
            match step {
                Step::Replace(group) => {
                    check_condition(&group.when)?;
                    crate::template::FileSelector::new(&group.files)?;
                    for rule in &group.rules {
                        rule.compile()?;
                        check_template(&rule.replacement)?;
                    }
                }
                Step::Prune(prune) => {
                    for name in &prune.features {
                        if !features.contains(name.as_str()) {
                            return Err(Error::Recipe(format!("unknown feature `{}` in prune", name)));
                        }
                    }
                }
                Step::PatchManifest(m) => {
                    check_condition(&m.when)?;
                    check_template(&m.path)?;
                }
                Step::Move(m) => {
                    check_condition(&m.when)?;
                    check_template(&m.from)?;
                    check_template(&m.to)?;
                }
                Step::Remove(r) => {
                    check_condition(&r.when)?;
                    for path in &r.paths {
                        check_template(path)?;
                    }
                }
            }
        }

        for task in &self.workflow {
            if let Task::Install(install) = task {
                check_condition(&install.when)?;
                if let Some(dir) = &install.dir {
                    check_template(dir)?;
                }
            }
        }
        for line in &self.next_steps {
            check_template(line)?;
        }

        let position = |wanted: fn(&Task) -> bool| self.workflow.iter().position(wanted);
        match (
            position(|t| matches!(t, Task::Clone)),
            position(|t| matches!(t, Task::Template)),
        ) {
            (Some(clone), Some(template)) if clone < template => Ok(()),
            _ => Err(Error::Recipe(
                "workflow must clone the boilerplate before the template task".to_string(),
            )),
        }
    }
}

/// Names referenced as `${name}` in `text`
fn referenced_fields(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else { break };
        names.push(&after[..end]);
        rest = &after[end + 1..];
    }
    names
}

/// The boilerplates shipped with the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boilerplate {
    /// WordPress plugin boilerplate
    Plugin,
    /// Stand-alone webpack workflow
    Webpack,
}

impl Boilerplate {
    pub fn name(&self) -> &'static str {
        match self {
            Boilerplate::Plugin => "plugin",
            Boilerplate::Webpack => "webpack",
        }
    }

    /// Environment variable overriding the repository
    pub fn repository_env(&self) -> &'static str {
        match self {
            Boilerplate::Plugin => "WP_STRAP_PLUGIN_REPO",
            Boilerplate::Webpack => "WP_STRAP_WEBPACK_REPO",
        }
    }

    pub(crate) fn source(&self) -> &'static str {
        match self {
            Boilerplate::Plugin => include_str!("../../recipes/plugin.yaml"),
            Boilerplate::Webpack => include_str!("../../recipes/webpack.yaml"),
        }
    }

    /// Built-in recipe with the environment override applied
    pub fn recipe(&self) -> Result<Recipe> {
        let mut recipe = Recipe::from_yaml(self.source())?;
        if let Ok(repo) = std::env::var(self.repository_env()) {
            if !repo.is_empty() {
                recipe.repository = repo;
            }
        }
        Ok(recipe)
    }
}

//! Project creation workflow
//!
//! Runs a recipe's tasks in order against a fresh project directory. Every
//! task is a numbered step reported through a [`Reporter`]. Clone, template
//! and install failures abort the run; cleanup failures are logged and the
//! run continues. Nothing is rolled back.

use crate::answers::AnswerSet;
use crate::error::Error;
use crate::fsops;
use crate::recipe::Recipe;
use crate::runtime::{PackageManager, RepoSource, Tool};
use crate::template::{self, interpolate, prune::remove_paths, Condition, TemplateReport, Verdict};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Dependency installation entry of a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallTask {
    pub manager: PackageManager,

    /// Directory relative to the project root; defaults to the root itself
    #[serde(default)]
    pub dir: Option<String>,

    #[serde(default, skip_serializing_if = "Condition::is_empty")]
    pub when: Condition,
}

/// One workflow entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum Task {
    /// Fetch the boilerplate into the project directory
    Clone,
    /// Run the recipe's template steps
    Template,
    Install(InstallTask),
    /// Remove version-control leftovers
    Cleanup,
}

/// Receives progress for every numbered step
pub trait Reporter {
    fn started(&mut self, step: &str);
    fn succeeded(&mut self, step: &str);
    fn failed(&mut self, step: &str, error: &anyhow::Error, fatal: bool);
    fn skipped(&mut self, _step: &str, _reason: &str) {}
}

/// Reports through `tracing`; used when no terminal UI is attached
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn started(&mut self, step: &str) {
        tracing::info!(%step, "started");
    }

    fn succeeded(&mut self, step: &str) {
        tracing::info!(%step, "done");
    }

    fn failed(&mut self, step: &str, error: &anyhow::Error, fatal: bool) {
        tracing::error!(%step, fatal, error = %format!("{:#}", error), "failed");
    }

    fn skipped(&mut self, step: &str, reason: &str) {
        tracing::info!(%step, %reason, "skipped");
    }
}

/// Numbers steps and applies the fatal/non-fatal policy
pub struct StepRunner<'r, R: Reporter> {
    reporter: &'r mut R,
    step: usize,
}

impl<'r, R: Reporter> StepRunner<'r, R> {
    pub fn new(reporter: &'r mut R) -> Self {
        Self { reporter, step: 1 }
    }

    fn describe(&mut self, what: &str) -> String {
        let describe = format!("{}. {}", self.step, what);
        self.step += 1;
        describe
    }

    /// Run a step that must succeed
    pub async fn required<T, F>(&mut self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let describe = self.describe(what);
        self.reporter.started(&describe);
        match fut.await {
            Ok(value) => {
                self.reporter.succeeded(&describe);
                Ok(value)
            }
            Err(e) => {
                self.reporter.failed(&describe, &e, true);
                Err(e.context(format!("'{}' was a required step, exiting now", describe)))
            }
        }
    }

    /// Run a step whose failure is only reported
    pub async fn optional<T, F>(&mut self, what: &str, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        let describe = self.describe(what);
        self.reporter.started(&describe);
        match fut.await {
            Ok(value) => {
                self.reporter.succeeded(&describe);
                Some(value)
            }
            Err(e) => {
                self.reporter.failed(&describe, &e, false);
                None
            }
        }
    }

    pub fn skip(&mut self, what: &str, reason: &str) {
        let describe = self.describe(what);
        self.reporter.skipped(&describe, reason);
    }
}

/// Everything a run needs besides the recipe and the answers
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory the project folder is created in
    pub parent_dir: PathBuf,
    pub source: RepoSource,
    pub branch: Option<String>,
    pub clone_timeout: Duration,
    pub skip_install: bool,
}

impl RunOptions {
    /// Options taken from the recipe's own settings
    pub fn for_recipe(recipe: &Recipe, parent_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            parent_dir,
            source: RepoSource::parse(&recipe.repository)?,
            branch: recipe.branch.clone(),
            clone_timeout: Duration::from_secs(recipe.clone_timeout_secs),
            skip_install: false,
        })
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct Outcome {
    pub project_dir: PathBuf,
    pub template: TemplateReport,
    /// Installers that ran
    pub installed: Vec<PackageManager>,
    /// Leftovers that could not be removed
    pub cleanup_failures: Vec<PathBuf>,
}

/// Install tasks that will run for these answers
fn active_installs<'a>(recipe: &'a Recipe, answers: &AnswerSet) -> Vec<&'a InstallTask> {
    let toggles = template::toggles(&recipe.features, answers);
    recipe
        .workflow
        .iter()
        .filter_map(|task| match task {
            Task::Install(install) => Some(install),
            _ => None,
        })
        .filter(|install| install.when.evaluate(answers, &toggles) == Verdict::Pass)
        .collect()
}

/// External tools the run will call, in a stable order
pub fn required_tools(recipe: &Recipe, answers: &AnswerSet, options: &RunOptions) -> Vec<Tool> {
    let mut tools = Vec::new();
    if options.source.is_remote() && recipe.workflow.contains(&Task::Clone) {
        tools.push(Tool::Git);
    }
    if !options.skip_install {
        tools.extend(active_installs(recipe, answers).iter().map(|i| i.manager.tool()));
    }
    tools.sort();
    tools.dedup();
    tools
}

/// Where an install task runs. `..` is resolved lexically because a template
/// step may have removed the project directory itself.
fn install_dir(project_dir: &Path, install: &InstallTask, answers: &AnswerSet) -> Result<PathBuf> {
    let dir = match &install.dir {
        Some(dir) => project_dir.join(interpolate(dir, answers)?),
        None => project_dir.to_path_buf(),
    };
    Ok(fsops::normalize(&dir))
}

fn clone_error(error: Error) -> anyhow::Error {
    match error {
        Error::Timeout(limit) => anyhow::Error::new(error).context(format!(
            "git clone may have timed out. Your timeout setting is {} seconds; \
             try again with a higher --timeout",
            limit.as_secs()
        )),
        other => anyhow::Error::new(other),
    }
}

/// Run every workflow task of `recipe` for `answers`
pub async fn run<R: Reporter>(
    recipe: &Recipe,
    answers: &AnswerSet,
    options: &RunOptions,
    reporter: &mut R,
) -> Result<Outcome> {
    let folder = answers
        .get(&recipe.directory_field)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            anyhow!(
                "`{}` has no value, so the project folder cannot be named",
                recipe.directory_field
            )
        })?;
    let project_dir = options.parent_dir.join(folder);
    if fsops::exists(&project_dir) {
        anyhow::bail!("{} already exists", project_dir.display());
    }

    let toggles = template::toggles(&recipe.features, answers);
    let mut runner = StepRunner::new(reporter);
    let mut outcome = Outcome {
        project_dir: project_dir.clone(),
        template: TemplateReport::default(),
        installed: Vec::new(),
        cleanup_failures: Vec::new(),
    };

    for task in &recipe.workflow {
        match task {
            Task::Clone => {
                let fetch = async {
                    options
                        .source
                        .fetch(&project_dir, options.branch.as_deref(), options.clone_timeout)
                        .await
                        .map_err(clone_error)
                };
                runner.required("Cloning repository", fetch).await?;
            }
            Task::Template => {
                let steps = recipe.steps.clone();
                let features = recipe.features.clone();
                let answers = answers.clone();
                let root = project_dir.clone();
                let apply = async move {
                    tokio::task::spawn_blocking(move || {
                        template::run_steps(&steps, &features, &answers, &root)
                    })
                    .await
                    .context("template task panicked")?
                    .map_err(anyhow::Error::new)
                };
                outcome.template = runner.required("Replacing project data", apply).await?;
            }
            Task::Install(install) => {
                if install.when.evaluate(answers, &toggles) != Verdict::Pass {
                    tracing::debug!(manager = %install.manager, "install not selected");
                    continue;
                }
                let what = format!("Installing {} dependencies", install.manager);
                if options.skip_install {
                    runner.skip(&what, "--skip-install");
                    continue;
                }
                let dir = install_dir(&project_dir, install, answers)?;
                let fut = async { install.manager.install(&dir).await.map_err(anyhow::Error::new) };
                runner.required(&what, fut).await?;
                outcome.installed.push(install.manager);
            }
            Task::Cleanup => {
                let mut failed: Vec<PathBuf> = Vec::new();
                let cleanup = async {
                    failed = remove_paths(&project_dir, &recipe.cleanup)
                        .failed
                        .into_iter()
                        .map(|(path, _)| path)
                        .collect();
                    if failed.is_empty() {
                        Ok(())
                    } else {
                        Err(anyhow!("could not remove {}", display_paths(&failed)))
                    }
                };
                runner.optional("Cleaning up", cleanup).await;
                outcome.cleanup_failures = failed;
            }
        }
    }

    Ok(outcome)
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;
    use std::fs;

    #[derive(Default)]
    struct Recording {
        events: Vec<String>,
    }

    impl Reporter for Recording {
        fn started(&mut self, step: &str) {
            self.events.push(format!("start {}", step));
        }
        fn succeeded(&mut self, step: &str) {
            self.events.push(format!("ok {}", step));
        }
        fn failed(&mut self, step: &str, _error: &anyhow::Error, fatal: bool) {
            self.events.push(format!("fail {} fatal={}", step, fatal));
        }
        fn skipped(&mut self, step: &str, _reason: &str) {
            self.events.push(format!("skip {}", step));
        }
    }

    const RECIPE: &str = r#"
name: Test plugin
description: test
repository: unused
questions:
  - { name: projectName, prompt: "Name:" }
  - { name: codesniffer, prompt: "Lint?", kind: yes_no }
  - name: package
    prompt: "Package:"
    build_from: { source: projectName, transform: slugify }
features:
  - name: codesniffer
    files: [phpcs.xml.dist]
    manifest:
      require-dev: [wp-coding-standards/wpcs]
      scripts: [phpcs]
steps:
  - action: replace
    files: ["*.php"]
    when: { requires: [projectName] }
    rules:
      - { find: "{{The Plugin Name}}", with: "${projectName}" }
  - action: prune
  - action: patch_manifest
    path: composer.json
  - action: move
    from: the-plugin-name.php
    to: "${package}.php"
workflow:
  - task: clone
  - task: template
  - task: install
    manager: composer
  - task: cleanup
"#;

    fn boilerplate() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("the-plugin-name.php"), "Plugin Name: {{The Plugin Name}}\n").unwrap();
        fs::write(root.join("phpcs.xml.dist"), "<ruleset/>").unwrap();
        fs::write(
            root.join("composer.json"),
            r#"{"name": "x", "require-dev": {"wp-coding-standards/wpcs": "^2", "lucatume/wp-browser": "^3"}, "scripts": {"phpcs": "phpcs"}}"#,
        )
        .unwrap();
        fs::create_dir_all(root.join(".github/workflows")).unwrap();
        fs::write(root.join(".github/workflows/ci.yml"), "on: push").unwrap();
        fs::write(root.join(".gitattributes"), "* text=auto").unwrap();
        dir
    }

    fn options(source: &tempfile::TempDir, parent: &tempfile::TempDir) -> RunOptions {
        RunOptions {
            parent_dir: parent.path().to_path_buf(),
            source: RepoSource::Local(source.path().to_path_buf()),
            branch: None,
            clone_timeout: Duration::from_secs(5),
            skip_install: true,
        }
    }

    fn answers(codesniffer: &str) -> AnswerSet {
        [
            ("projectName", "Cool Plugin"),
            ("codesniffer", codesniffer),
            ("package", "cool-plugin"),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_disabled_linter_leaves_no_trace() {
        let recipe = Recipe::from_yaml(RECIPE).unwrap();
        let source = boilerplate();
        let parent = tempfile::tempdir().unwrap();
        let mut reporter = Recording::default();

        let outcome = run(&recipe, &answers("no"), &options(&source, &parent), &mut reporter)
            .await
            .unwrap();

        let project = parent.path().join("cool-plugin");
        assert_eq!(outcome.project_dir, project);
        assert_eq!(
            fs::read_to_string(project.join("cool-plugin.php")).unwrap(),
            "Plugin Name: Cool Plugin\n"
        );
        assert!(!project.join("phpcs.xml.dist").exists());
        let composer: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(project.join("composer.json")).unwrap())
                .unwrap();
        assert!(composer["require-dev"].get("wp-coding-standards/wpcs").is_none());
        assert!(composer["require-dev"].get("lucatume/wp-browser").is_some());
        assert!(composer["scripts"].get("phpcs").is_none());
        assert!(!project.join(".github").exists());
        assert!(!project.join(".gitattributes").exists());

        assert_eq!(
            reporter.events,
            vec![
                "start 1. Cloning repository",
                "ok 1. Cloning repository",
                "start 2. Replacing project data",
                "ok 2. Replacing project data",
                "skip 3. Installing Composer dependencies",
                "start 4. Cleaning up",
                "ok 4. Cleaning up",
            ]
        );
    }

    #[tokio::test]
    async fn test_enabled_linter_is_kept() {
        let recipe = Recipe::from_yaml(RECIPE).unwrap();
        let source = boilerplate();
        let parent = tempfile::tempdir().unwrap();

        run(&recipe, &answers("yes"), &options(&source, &parent), &mut LogReporter)
            .await
            .unwrap();

        let project = parent.path().join("cool-plugin");
        assert!(project.join("phpcs.xml.dist").exists());
        assert!(fs::read_to_string(project.join("composer.json"))
            .unwrap()
            .contains("wp-coding-standards/wpcs"));
    }

    #[tokio::test]
    async fn test_failed_template_step_is_fatal() {
        let recipe = Recipe::from_yaml(RECIPE).unwrap();
        let source = boilerplate();
        fs::write(source.path().join("composer.json"), "{ broken").unwrap();
        let parent = tempfile::tempdir().unwrap();
        let mut reporter = Recording::default();

        let err = run(&recipe, &answers("no"), &options(&source, &parent), &mut reporter)
            .await
            .unwrap_err();

        assert!(err
            .to_string()
            .contains("'2. Replacing project data' was a required step"));
        assert!(reporter
            .events
            .contains(&"fail 2. Replacing project data fatal=true".to_string()));
        assert!(!reporter.events.iter().any(|e| e.contains("Cleaning up")));
    }

    #[tokio::test]
    async fn test_existing_project_dir_is_refused() {
        let recipe = Recipe::from_yaml(RECIPE).unwrap();
        let source = boilerplate();
        let parent = tempfile::tempdir().unwrap();
        fs::create_dir(parent.path().join("cool-plugin")).unwrap();

        let err = run(&recipe, &answers("no"), &options(&source, &parent), &mut LogReporter)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_required_tools_follow_answers_and_source() {
        let recipe = Recipe::from_yaml(RECIPE).unwrap();
        let source = boilerplate();
        let parent = tempfile::tempdir().unwrap();
        let mut opts = options(&source, &parent);

        assert!(required_tools(&recipe, &answers("no"), &opts).is_empty());

        opts.skip_install = false;
        opts.source = RepoSource::parse("https://example.com/boilerplate.git").unwrap();
        assert_eq!(
            required_tools(&recipe, &answers("no"), &opts),
            vec![Tool::Git, Tool::Composer]
        );
    }

    fn webpack_boilerplate() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("assets/src/js")).unwrap();
        fs::write(root.join("assets/src/js/app.js"), "import '../sass/app.scss';\n").unwrap();
        fs::write(root.join("package.json"), r#"{"name": "wordpress-webpack"}"#).unwrap();
        fs::write(root.join("webpack.config.js"), "module.exports = {};\n").unwrap();
        fs::write(root.join(".gitattributes"), "* text=auto").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_current_folder_install_runs_in_parent() {
        let recipe = Recipe::from_yaml(crate::recipe::Boilerplate::Webpack.source()).unwrap();
        let source = webpack_boilerplate();
        let parent = tempfile::tempdir().unwrap();
        let answers: AnswerSet = [
            ("projectName", "Cool Project"),
            ("author", "Dev Co"),
            ("authorEmail", "hi@dev.co"),
            ("url", "dev.co"),
            ("package", "cool-project"),
            ("css", "Sass+PostCSS"),
            ("folder", "Current folder"),
        ]
        .into_iter()
        .collect();
        let mut reporter = Recording::default();

        let outcome = run(&recipe, &answers, &options(&source, &parent), &mut reporter)
            .await
            .unwrap();

        assert!(!outcome.project_dir.exists());
        assert!(parent.path().join("package.json").exists());
        assert!(parent.path().join("assets/src/js/app.js").exists());
        assert!(reporter
            .events
            .contains(&"skip 3. Installing Webpack dependencies".to_string()));

        let installs = active_installs(&recipe, &answers);
        assert_eq!(installs.len(), 1);
        let dir = install_dir(&outcome.project_dir, installs[0], &answers).unwrap();
        assert_eq!(dir, parent.path());
        assert!(dir.join("package.json").is_file());
    }

    #[test]
    fn test_install_dir_defaults_to_project() {
        let install = InstallTask {
            manager: PackageManager::Composer,
            dir: None,
            when: Condition::default(),
        };
        let project = Path::new("/srv/plugins/cool-plugin");
        assert_eq!(
            install_dir(project, &install, &AnswerSet::new()).unwrap(),
            project
        );
    }

    #[test]
    fn test_timeout_hint_names_the_setting() {
        let err = clone_error(Error::Timeout(Duration::from_secs(45)));
        assert!(format!("{:#}", err).contains("Your timeout setting is 45 seconds"));
    }
}

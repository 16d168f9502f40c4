//! Charm-style CLI prompts using cliclack

use crate::answers::{AnswerSet, Prefill};
use crate::error::Error;
use crate::prompt::{collect_answers, Prompter};
use crate::recipe::{check_compatibility, Boilerplate, Recipe};
use crate::runtime::check_tools;
use crate::schema::{FieldSpec, QuestionKind};
use crate::template::interpolate;
use crate::workflow::{self, Outcome, Reporter, RunOptions};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

const UPGRADE_COMMAND: &str = "cargo install wp-strap --force";

/// CLI arguments shared by both subcommands
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// `name:value` tokens answering questions up front
    pub tokens: Vec<String>,

    /// Accept the answer summary without asking
    pub yes: bool,

    /// Clone timeout in seconds, overriding the recipe
    pub timeout: Option<u64>,

    /// Branch or tag of the boilerplate to clone
    pub branch: Option<String>,

    /// Directory the project folder is created in
    pub directory: Option<PathBuf>,

    /// Recipe file replacing the built-in one
    pub recipe: Option<PathBuf>,

    /// Do not run yarn/composer
    pub skip_install: bool,

    /// Do not check for git/yarn/composer before starting
    pub skip_tool_check: bool,
}

/// Run one boilerplate interactively
pub async fn run(boilerplate: Boilerplate, args: CreateArgs, cli_version: &str) -> Result<()> {
    let recipe = match &args.recipe {
        Some(path) => Recipe::load(path)
            .with_context(|| format!("Failed to load recipe {}", path.display()))?,
        None => boilerplate.recipe()?,
    };

    cliclack::intro(format!("WP-Strap: {}", recipe.name))?;

    if let Some(min) = &recipe.min_cli_version {
        if let Some(warning) = check_compatibility(cli_version, min, UPGRADE_COMMAND) {
            cliclack::log::warning(format!(
                "Version warning: {}",
                warning.lines().next().unwrap_or(&warning)
            ))?;
        }
    }

    // Step 1: Predefined answers
    let prefills = Prefill::parse_all(&args.tokens);
    for prefill in &prefills {
        cliclack::log::info(format!("{}: {}", prefill.name, prefill.value.cyan()))?;
    }
    let schema = recipe.questions.with_prefills(&prefills);

    // Step 2: Collect the rest
    let answers = collect_answers(&schema, &mut ClackPrompter, args.yes)?;

    // Step 3: Resolve where and how to run
    let options = run_options(&recipe, &args)?;

    // Step 4: Check tools
    if args.skip_tool_check {
        cliclack::log::info("Skipping tool check")?;
    } else {
        verify_tools(&workflow::required_tools(&recipe, &answers, &options))?;
    }

    // Step 5: Create project
    let mut reporter = SpinnerReporter::default();
    let outcome = workflow::run(&recipe, &answers, &options, &mut reporter).await?;

    // Step 6: Show next steps
    print_next_steps(&recipe, &answers, &outcome)?;

    Ok(())
}

fn run_options(recipe: &Recipe, args: &CreateArgs) -> Result<RunOptions> {
    let current_dir = std::env::current_dir().context("Failed to read the current directory")?;
    let parent_dir = match &args.directory {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };
    if !parent_dir.is_dir() {
        anyhow::bail!("Directory does not exist: {}", parent_dir.display());
    }

    let mut options = RunOptions::for_recipe(recipe, parent_dir)?;
    if let Some(branch) = &args.branch {
        options.branch = Some(branch.clone());
    }
    if let Some(secs) = args.timeout {
        options.clone_timeout = Duration::from_secs(secs);
    }
    options.skip_install = args.skip_install;

    cliclack::log::info(format!("Using {}", options.source))?;
    Ok(options)
}

fn verify_tools(tools: &[crate::runtime::Tool]) -> Result<()> {
    if tools.is_empty() {
        return Ok(());
    }

    let spinner = cliclack::spinner();
    spinner.start("Checking tools...");

    match check_tools(tools) {
        Ok(found) => {
            let info: Vec<String> = found
                .iter()
                .map(|t| format!("{} ({})", t.tool, t.version.as_deref().unwrap_or("unknown")))
                .collect();
            spinner.stop(format!("Detected tools: {}", info.join(", ")));
            Ok(())
        }
        Err(e) => {
            spinner.stop("Missing tools");
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!("Please install the missing tools and try again.");
        }
    }
}

/// Esc and Ctrl+C inside a prompt surface as `Interrupted`
fn prompt_error(e: io::Error) -> anyhow::Error {
    if e.kind() == io::ErrorKind::Interrupted {
        let _ = console::Term::stderr().show_cursor();
        Error::Cancelled.into()
    } else {
        e.into()
    }
}

struct ClackPrompter;

impl Prompter for ClackPrompter {
    fn ask(&mut self, field: &FieldSpec) -> Result<String> {
        match field.kind {
            QuestionKind::Text => {
                let mut input = cliclack::input(&field.prompt);
                if let Some(default) = &field.default {
                    input = input.placeholder(default).default_input(default);
                }
                input.interact().map_err(prompt_error)
            }
            QuestionKind::YesNo | QuestionKind::Choice => {
                let mut select = cliclack::select(&field.prompt);
                for option in field.options() {
                    select = select.item(option.to_string(), option, "");
                }
                if let Some(default) = &field.default {
                    select = select.initial_value(default.clone());
                }
                select.interact().map_err(prompt_error)
            }
        }
    }

    fn confirm_summary(&mut self, answers: &AnswerSet) -> Result<bool> {
        cliclack::note("Your answers", answers.to_string().trim_end())?;
        cliclack::confirm("Looks good?")
            .initial_value(true)
            .interact()
            .map_err(prompt_error)
    }

    fn resolved(&mut self, field: &FieldSpec, value: &str) -> Result<()> {
        cliclack::log::info(format!("{} {}", field.prompt, value.cyan()))?;
        Ok(())
    }
}

/// One spinner per workflow step
#[derive(Default)]
struct SpinnerReporter {
    spinner: Option<cliclack::ProgressBar>,
}

impl Reporter for SpinnerReporter {
    fn started(&mut self, step: &str) {
        let spinner = cliclack::spinner();
        spinner.start(step);
        self.spinner = Some(spinner);
    }

    fn succeeded(&mut self, step: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(step);
        }
    }

    fn failed(&mut self, step: &str, error: &anyhow::Error, fatal: bool) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(step);
        }
        let message = format!("{:#}", error);
        let written = if fatal {
            cliclack::log::error(message)
        } else {
            cliclack::log::warning(format!("{} (continuing)", message))
        };
        terminal_write(written);
    }

    fn skipped(&mut self, step: &str, reason: &str) {
        terminal_write(cliclack::log::info(format!(
            "{} {}",
            step,
            format!("(skipped: {})", reason).dimmed()
        )));
    }
}

/// Reporter callbacks cannot fail; a lost terminal line is logged instead
fn terminal_write(result: io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "could not write to the terminal");
            false
        }
    }
}

fn print_next_steps(recipe: &Recipe, answers: &AnswerSet, outcome: &Outcome) -> Result<()> {
    cliclack::log::success("Project is created!")?;

    if !outcome.cleanup_failures.is_empty() {
        cliclack::log::warning(format!(
            "Remove these leftovers by hand: {}",
            outcome
                .cleanup_failures
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))?;
    }

    let mut steps = Vec::new();
    if outcome.project_dir.exists() {
        steps.push(format!("cd {}", outcome.project_dir.display()));
    }
    for line in &recipe.next_steps {
        steps.push(interpolate(line, answers)?);
    }

    println!();
    println!("  Next steps");
    println!();
    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }
    if let Some(docs) = &recipe.docs_url {
        println!();
        println!(
            "  Please read the documentation {} if you run into any issues or have any questions.",
            docs.cyan()
        );
    }
    println!();

    cliclack::outro("Good luck!")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_write_failure_is_not_fatal() {
        assert!(terminal_write(Ok(())));
        assert!(!terminal_write(Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "terminal closed"
        ))));
    }

    #[test]
    fn test_interrupted_prompt_means_cancelled() {
        let err = prompt_error(io::Error::new(io::ErrorKind::Interrupted, "esc"));
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Cancelled)));

        let err = prompt_error(io::Error::new(io::ErrorKind::Other, "tty gone"));
        assert!(err.downcast_ref::<Error>().is_none());
    }
}

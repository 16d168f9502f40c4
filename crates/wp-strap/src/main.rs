//! wp-strap CLI - WordPress plugins and webpack workflows from the WP-Strap boilerplates

use clap::{Parser, Subcommand};
use strap_core::{Boilerplate, CreateArgs, Error};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter
const LOG_ENV: &str = "WP_STRAP_LOG";

/// Exit code when the user leaves before anything ran
const EXIT_CANCELLED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "wp-strap")]
#[command(about = "CLI for creating WordPress plugins and webpack workflows")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new WP plugin. Should be run inside your plugins folder (wp-content/plugins)
    Plugin(CliCreateArgs),
    /// Add a webpack workflow to your WP project
    Webpack(CliCreateArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Answers given up front, e.g. projectName:"Cool Plugin" codesniffer:no
    #[arg(value_name = "NAME:VALUE")]
    pub answers: Vec<String>,

    /// Skip the summary confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Seconds to wait for the repository clone
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Branch or tag of the boilerplate to clone
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Directory to create the project in (defaults to the current directory)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Recipe file to use instead of the built-in one (for development use)
    #[arg(long)]
    pub recipe: Option<PathBuf>,

    /// Do not install yarn/composer dependencies
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Skip the git/yarn/composer availability check
    #[arg(long = "skip-tool-check")]
    pub skip_tool_check: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            tokens: args.answers,
            yes: args.yes,
            timeout: args.timeout,
            branch: args.branch,
            directory: args.directory,
            recipe: args.recipe,
            skip_install: args.skip_install,
            skip_tool_check: args.skip_tool_check,
        }
    }
}

fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV)
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn is_cancelled(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<Error>(), Some(Error::Cancelled)))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    init_logging();

    let args = Args::parse();
    let (boilerplate, create_args) = match args.command {
        Command::Plugin(create_args) => (Boilerplate::Plugin, create_args),
        Command::Webpack(create_args) => (Boilerplate::Webpack, create_args),
    };
    tracing::debug!(boilerplate = boilerplate.name(), "starting");

    let result = strap_core::run(boilerplate, create_args.into(), CLI_VERSION).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancelled(&e) => {
            eprintln!("Cancelled, nothing was created.");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

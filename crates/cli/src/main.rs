mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zipship_lib::config::{self, ConfigOverrides, ProjectConfig};
use zipship_lib::task::{RunOptions, TaskKind};

use crate::output::OutputFormat;

/// zipship - clean, package and test a Python source tree
#[derive(Parser)]
#[command(name = "zipship")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project root (default: current directory)
  #[arg(short = 'C', long = "directory", global = true, default_value = ".")]
  directory: PathBuf,

  /// Interpreter for the artifact's #! line [env: ZIPSHIP_PYTHON]
  #[arg(long, global = true)]
  python: Option<String>,

  /// Artifact file name under target/ [env: ZIPSHIP_NAME]
  #[arg(long, global = true)]
  name: Option<String>,

  /// Source directory to package and test against [env: ZIPSHIP_SRC]
  #[arg(long, global = true)]
  src: Option<PathBuf>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Remove build output, CI scratch, bytecode caches and coverage data
  Clean {
    /// Show what would be removed without removing anything
    #[arg(long)]
    dry_run: bool,
  },

  /// Package the source directory into target/<name> (runs clean first)
  Compile,

  /// Run the test suite with bytecode caching disabled (runs clean first)
  Test {
    /// Extra arguments for the test runner
    #[arg(last = true)]
    args: Vec<String>,
  },

  /// Run the test suite with coverage measurement (runs clean first)
  TestWithCoverage {
    /// Extra arguments for the test runner
    #[arg(last = true)]
    args: Vec<String>,
  },

  /// Run several tasks in one plan, each at most once
  Run {
    /// Tasks to run, in order
    #[arg(required = true)]
    tasks: Vec<TaskKind>,

    /// Extra arguments for the test runner
    #[arg(last = true)]
    args: Vec<String>,
  },

  /// List tasks and their prerequisites
  Tasks,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match run(cli) {
    Ok(code) => code,
    Err(e) => {
      output::print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

fn init_logging(verbose: bool) {
  let default = if verbose { "zipship=debug,zipship_lib=debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .compact()
    .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
  let (tasks, options) = match cli.command {
    Commands::Tasks => return cmd::cmd_tasks(cli.output).map(|()| ExitCode::SUCCESS),
    Commands::Clean { dry_run } => (
      vec![TaskKind::Clean],
      RunOptions {
        dry_run,
        ..Default::default()
      },
    ),
    Commands::Compile => (vec![TaskKind::Compile], RunOptions::default()),
    Commands::Test { args } => (
      vec![TaskKind::Test],
      RunOptions {
        test_args: args,
        ..Default::default()
      },
    ),
    Commands::TestWithCoverage { args } => (
      vec![TaskKind::TestWithCoverage],
      RunOptions {
        test_args: args,
        ..Default::default()
      },
    ),
    Commands::Run { tasks, args } => (
      tasks,
      RunOptions {
        test_args: args,
        ..Default::default()
      },
    ),
  };

  let overrides = ConfigOverrides {
    python: cli.python,
    name: cli.name,
    src: cli.src,
  };
  let config = load_config(&cli.directory, &overrides)?;

  cmd::cmd_run(&config, &tasks, &options, cli.output)
}

fn load_config(directory: &std::path::Path, overrides: &ConfigOverrides) -> Result<ProjectConfig> {
  config::load(directory, overrides).context("Failed to load configuration")
}

//! Implementation of the task commands (`clean`, `compile`, `test`,
//! `test-with-coverage` and `run`).
//!
//! Expands the requested tasks into a plan, executes it and prints each
//! task's outcome as it completes. The process exit code follows the first
//! failure; a failing test runner's own code is passed through unchanged.

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use zipship_lib::config::ProjectConfig;
use zipship_lib::task::{RunOptions, TaskError, TaskEvent, TaskGraph, TaskKind, TaskOutcome, execute_plan};

use crate::output::{
  OutputFormat, format_bytes, format_duration, print_error, print_header, print_info, print_json, print_stat,
  print_success, short_digest, symbols,
};

pub fn cmd_run(
  config: &ProjectConfig,
  requested: &[TaskKind],
  options: &RunOptions,
  output: OutputFormat,
) -> Result<ExitCode> {
  let start = Instant::now();

  let plan = TaskGraph::standard()
    .and_then(|graph| graph.plan(requested))
    .context("Failed to plan tasks")?;
  debug!(requested = ?requested, plan = ?plan, "expanded plan");

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  let report = rt.block_on(execute_plan(config, &plan, options, |event| {
    if output.is_json() {
      return;
    }
    match event {
      TaskEvent::Started(task) => print_header(task.name()),
      TaskEvent::Finished(outcome) => print_outcome(&config.root, outcome),
    }
  }));

  if output.is_json() {
    print_json(&report)?;
  } else if let Some(failure) = &report.failed {
    // A failing runner has already said why on the terminal.
    if !matches!(failure.error, TaskError::TestsFailed { .. }) {
      print_error(&format!("{} failed: {}", failure.task, failure.error));
    }
  } else {
    println!();
    print_success(&format!("Done in {}", format_duration(start.elapsed())));
  }

  Ok(exit_code(report.exit_code()))
}

fn exit_code(code: i32) -> ExitCode {
  match code {
    0 => ExitCode::SUCCESS,
    code => ExitCode::from(u8::try_from(code).unwrap_or(1)),
  }
}

fn relative<'a>(root: &Path, path: &'a Path) -> std::path::Display<'a> {
  path.strip_prefix(root).unwrap_or(path).display()
}

fn print_outcome(root: &Path, outcome: &TaskOutcome) {
  match outcome {
    TaskOutcome::Clean(report) => {
      if report.dry_run {
        print_info("Dry run - no changes made");
        for path in &report.removed {
          println!("  {} {}", symbols::REMOVE, relative(root, path));
        }
        print_stat("Would free", format_bytes(report.bytes_freed));
      } else if report.removed.is_empty() {
        print_info("Nothing to clean");
      } else {
        print_success(&format!("Removed {} path(s)", report.removed.len()));
        print_stat("Space freed", format_bytes(report.bytes_freed));
      }
    }
    TaskOutcome::Compile(report) => {
      print_success(&format!("Built {}", relative(root, &report.artifact)));
      print_stat("Interpreter", &report.interpreter);
      print_stat("Entries", report.entries);
      print_stat("Size", format_bytes(report.size_bytes));
      print_stat("SHA-256", short_digest(&report.sha256.0));
    }
    TaskOutcome::Test(_) => print_success("Test suite passed"),
    TaskOutcome::TestWithCoverage(_) => print_success("Test suite passed with coverage"),
  }
}

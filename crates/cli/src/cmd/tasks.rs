//! Implementation of the `zipship tasks` command.

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use zipship_lib::task::{TaskGraph, TaskKind};

use crate::output::{OutputFormat, print_json, symbols};

#[derive(Serialize)]
struct TaskInfo {
  name: &'static str,
  prerequisites: Vec<TaskKind>,
  description: &'static str,
}

/// List every task with its direct prerequisites.
pub fn cmd_tasks(output: OutputFormat) -> Result<()> {
  let graph = TaskGraph::standard().context("Failed to build task graph")?;

  let tasks: Vec<TaskInfo> = TaskKind::ALL
    .into_iter()
    .map(|task| TaskInfo {
      name: task.name(),
      prerequisites: graph.prerequisites(task),
      description: task.description(),
    })
    .collect();

  if output.is_json() {
    return print_json(&tasks);
  }

  for task in &tasks {
    let after = if task.prerequisites.is_empty() {
      String::new()
    } else {
      let names: Vec<&str> = task.prerequisites.iter().map(|t| t.name()).collect();
      format!(" (after {})", names.join(", "))
    };
    println!(
      "  {} {:<20} {}{}",
      symbols::INFO,
      task.name,
      task.description,
      after.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }

  Ok(())
}

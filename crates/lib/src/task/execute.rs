//! Sequential plan execution.
//!
//! Tasks run one after another on the calling task; each step finishes
//! before the next starts, and the first failure ends the run.

use tracing::{debug, error, info};

use super::TaskKind;
use super::types::{RunReport, TaskError, TaskFailure, TaskOutcome};
use crate::clean::clean;
use crate::config::ProjectConfig;
use crate::package::package;
use crate::runner::run_tests;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  /// Report what `clean` would remove without removing it.
  pub dry_run: bool,
  /// Extra arguments for the test runner, after the configured ones.
  pub test_args: Vec<String>,
}

/// Progress notifications emitted while a plan runs.
#[derive(Debug)]
pub enum TaskEvent<'a> {
  Started(TaskKind),
  Finished(&'a TaskOutcome),
}

/// Run a single task, without its prerequisites.
pub async fn run_task(config: &ProjectConfig, task: TaskKind, options: &RunOptions) -> Result<TaskOutcome, TaskError> {
  match task {
    TaskKind::Clean => Ok(TaskOutcome::Clean(clean(config, options.dry_run)?)),
    TaskKind::Compile => Ok(TaskOutcome::Compile(package(config)?)),
    TaskKind::Test | TaskKind::TestWithCoverage => {
      let coverage = task == TaskKind::TestWithCoverage;
      let report = run_tests(config, coverage, &options.test_args).await?;
      if !report.success {
        return Err(TaskError::TestsFailed {
          task,
          code: report.exit_code,
        });
      }
      Ok(if coverage {
        TaskOutcome::TestWithCoverage(report)
      } else {
        TaskOutcome::Test(report)
      })
    }
  }
}

/// Execute `plan` in order, stopping at the first failure.
///
/// `on_event` is called before each task starts and after it completes.
pub async fn execute_plan<F>(config: &ProjectConfig, plan: &[TaskKind], options: &RunOptions, mut on_event: F) -> RunReport
where
  F: FnMut(TaskEvent<'_>),
{
  info!(plan = ?plan, "executing plan");

  let mut report = RunReport {
    plan: plan.to_vec(),
    ..Default::default()
  };

  for &task in plan {
    debug!(task = %task, "starting task");
    on_event(TaskEvent::Started(task));

    match run_task(config, task, options).await {
      Ok(outcome) => {
        info!(task = %task, "task succeeded");
        on_event(TaskEvent::Finished(&outcome));
        report.completed.push(outcome);
      }
      Err(e) => {
        error!(task = %task, error = %e, "task failed");
        report.failed = Some(TaskFailure { task, error: e });
        break;
      }
    }
  }

  info!(
    completed = report.completed.len(),
    failed = report.failed.is_some(),
    "plan finished"
  );

  report
}

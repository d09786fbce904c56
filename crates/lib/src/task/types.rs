//! Error, outcome and report types for task execution.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::TaskKind;
use crate::clean::{CleanError, CleanReport};
use crate::package::{PackageError, PackageReport};
use crate::runner::{RunnerError, TestReport};

#[derive(Debug, Error)]
#[error("unknown task '{0}' (expected one of: clean, compile, test, test-with-coverage)")]
pub struct UnknownTask(pub String);

#[derive(Debug, Error)]
pub enum TaskError {
  #[error(transparent)]
  Clean(#[from] CleanError),

  #[error(transparent)]
  Package(#[from] PackageError),

  #[error(transparent)]
  Runner(#[from] RunnerError),

  /// The runner ran and exited non-zero. Its own output already explains why.
  #[error("{task} exited with status {code}")]
  TestsFailed { task: TaskKind, code: i32 },

  #[error("dependency cycle detected at task {0}")]
  CycleDetected(TaskKind),
}

impl TaskError {
  /// Process exit code for this failure.
  ///
  /// A failing test run propagates the runner's own code; everything else is 1.
  pub fn exit_code(&self) -> i32 {
    match self {
      TaskError::TestsFailed { code, .. } => *code,
      _ => 1,
    }
  }
}

/// Result of one successfully completed task.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "task", rename_all = "kebab-case")]
pub enum TaskOutcome {
  Clean(CleanReport),
  Compile(PackageReport),
  Test(TestReport),
  TestWithCoverage(TestReport),
}

impl TaskOutcome {
  pub fn task(&self) -> TaskKind {
    match self {
      TaskOutcome::Clean(_) => TaskKind::Clean,
      TaskOutcome::Compile(_) => TaskKind::Compile,
      TaskOutcome::Test(_) => TaskKind::Test,
      TaskOutcome::TestWithCoverage(_) => TaskKind::TestWithCoverage,
    }
  }
}

/// The task that stopped a plan, and why.
#[derive(Debug)]
pub struct TaskFailure {
  pub task: TaskKind,
  pub error: TaskError,
}

impl Serialize for TaskFailure {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("TaskFailure", 3)?;
    state.serialize_field("task", &self.task)?;
    state.serialize_field("message", &self.error.to_string())?;
    state.serialize_field("exit_code", &self.error.exit_code())?;
    state.end()
  }
}

/// Result of executing a plan.
///
/// Execution stops at the first failure; tasks after it are neither run
/// nor listed in `completed`.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
  pub plan: Vec<TaskKind>,
  pub completed: Vec<TaskOutcome>,
  pub failed: Option<TaskFailure>,
}

impl RunReport {
  pub fn is_success(&self) -> bool {
    self.failed.is_none()
  }

  pub fn exit_code(&self) -> i32 {
    self.failed.as_ref().map(|f| f.error.exit_code()).unwrap_or(0)
  }
}

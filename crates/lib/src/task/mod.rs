//! Tasks, their dependency graph and plan execution.
//!
//! There are four tasks. `compile`, `test` and `test-with-coverage` each
//! require `clean` to run first. A request for one or more tasks is expanded
//! into a plan: prerequisites before dependents, every task at most once.

pub mod dag;
pub mod execute;
pub mod types;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use dag::TaskGraph;
pub use execute::{RunOptions, TaskEvent, execute_plan, run_task};
pub use types::{RunReport, TaskError, TaskFailure, TaskOutcome, UnknownTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
  Clean,
  Compile,
  Test,
  TestWithCoverage,
}

impl TaskKind {
  pub const ALL: [TaskKind; 4] = [
    TaskKind::Clean,
    TaskKind::Compile,
    TaskKind::Test,
    TaskKind::TestWithCoverage,
  ];

  /// Name used on the command line.
  pub fn name(self) -> &'static str {
    match self {
      TaskKind::Clean => "clean",
      TaskKind::Compile => "compile",
      TaskKind::Test => "test",
      TaskKind::TestWithCoverage => "test-with-coverage",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      TaskKind::Clean => "Remove build output, CI scratch, bytecode caches and coverage data",
      TaskKind::Compile => "Package the source directory into a self-executing archive",
      TaskKind::Test => "Run the test suite with bytecode caching disabled",
      TaskKind::TestWithCoverage => "Run the test suite with coverage measurement",
    }
  }

  /// Tasks that must run before this one.
  pub fn prerequisites(self) -> &'static [TaskKind] {
    match self {
      TaskKind::Clean => &[],
      TaskKind::Compile | TaskKind::Test | TaskKind::TestWithCoverage => &[TaskKind::Clean],
    }
  }
}

impl fmt::Display for TaskKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for TaskKind {
  type Err = UnknownTask;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    TaskKind::ALL
      .into_iter()
      .find(|task| task.name() == s)
      .ok_or_else(|| UnknownTask(s.to_string()))
  }
}

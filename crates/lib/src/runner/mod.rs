//! Test-suite runner invocation.
//!
//! The runner is an external program (`pytest` by default). It runs in the
//! project root with the source directory as its module search path and
//! bytecode caching disabled. Its stdio is inherited and its exit status is
//! reported unchanged; nothing it prints is captured or rewritten.

pub mod invocation;

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ProjectConfig;

pub use invocation::TestInvocation;

#[derive(Debug, Error)]
pub enum RunnerError {
  #[error("coverage config not found: {0}")]
  CoverageConfigNotFound(PathBuf),

  #[error("failed to run {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
  pub command: String,
  pub coverage: bool,
  pub success: bool,
  pub exit_code: i32,
}

/// Run the test suite once.
///
/// A runner that exits non-zero is not an error here; check
/// [`TestReport::success`]. Errors mean the runner never ran.
pub async fn run_tests(
  config: &ProjectConfig,
  coverage: bool,
  extra_args: &[String],
) -> Result<TestReport, RunnerError> {
  if coverage {
    let coverage_config = config.coverage_config_path();
    if !coverage_config.is_file() {
      return Err(RunnerError::CoverageConfigNotFound(coverage_config));
    }
  }

  let invocation = TestInvocation::new(config, coverage, extra_args);
  let command_line = invocation.command_line();
  info!(command = %command_line, coverage, "running test suite");

  let mut command = Command::new(&invocation.program);
  command
    .args(&invocation.args)
    .current_dir(&invocation.cwd)
    .envs(&invocation.env)
    .kill_on_drop(true);

  debug!(cwd = %invocation.cwd.display(), "spawning runner");

  let status = command.status().await.map_err(|source| RunnerError::Spawn {
    program: invocation.program.clone(),
    source,
  })?;
  let exit_code = exit_code(status);

  info!(exit_code, success = status.success(), "test suite finished");

  Ok(TestReport {
    command: command_line,
    coverage,
    success: status.success(),
    exit_code,
  })
}

/// Map an exit status to a process exit code.
///
/// A child killed by a signal maps to `128 + signal`, as shells report it.
#[cfg(unix)]
pub fn exit_code(status: ExitStatus) -> i32 {
  use std::os::unix::process::ExitStatusExt;

  match (status.code(), status.signal()) {
    (Some(code), _) => code,
    (None, Some(signal)) => 128 + signal,
    (None, None) => 1,
  }
}

#[cfg(not(unix))]
pub fn exit_code(status: ExitStatus) -> i32 {
  status.code().unwrap_or(1)
}

//! Construction of the test-runner command line and environment overlay.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::ProjectConfig;
use crate::consts::{DONT_WRITE_BYTECODE_ENV, PYTHONPATH_ENV};

/// A fully resolved runner invocation.
///
/// The environment here is an overlay applied to the child only; it is
/// merged over the inherited environment and never touches our own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInvocation {
  pub program: String,
  pub args: Vec<String>,
  pub env: BTreeMap<&'static str, OsString>,
  pub cwd: PathBuf,
}

impl TestInvocation {
  /// Build the invocation for `test` (`coverage == false`) or
  /// `test-with-coverage` (`coverage == true`).
  ///
  /// Argument order: runner command, coverage flags, configured args,
  /// then `extra_args`.
  pub fn new(config: &ProjectConfig, coverage: bool, extra_args: &[String]) -> Self {
    let mut command = config.test.runner.iter().cloned();
    let program = command.next().unwrap_or_default();
    let mut args: Vec<String> = command.collect();

    if coverage {
      args.push(format!("--cov={}", config.test.coverage_module));
      args.push("--cov-report=term-missing".to_string());
      args.push(format!("--cov-config={}", config.test.coverage_config.display()));
    }
    args.extend(config.test.args.iter().cloned());
    args.extend(extra_args.iter().cloned());

    let mut env = BTreeMap::new();
    env.insert(PYTHONPATH_ENV, config.src.clone().into_os_string());
    env.insert(DONT_WRITE_BYTECODE_ENV, OsString::from("1"));

    Self {
      program,
      args,
      env,
      cwd: config.root.clone(),
    }
  }

  /// Shell-like rendering for logs and reports.
  pub fn command_line(&self) -> String {
    let mut parts = Vec::with_capacity(self.env.len() + self.args.len() + 1);
    for (key, value) in &self.env {
      parts.push(format!("{}={}", key, value.to_string_lossy()));
    }
    parts.push(self.program.clone());
    parts.extend(self.args.iter().cloned());
    parts.join(" ")
  }
}

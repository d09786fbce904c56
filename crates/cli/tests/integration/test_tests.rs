//! `test` and `test-with-coverage`, driven by a shell stand-in for the runner.

#![cfg(unix)]

use predicates::prelude::*;

use super::common::{TestEnv, exists};

#[test]
fn test_runs_runner_with_source_path() {
  let env = TestEnv::with_sources();
  env.fake_runner(0);

  env
    .zipship_cmd()
    .arg("test")
    .assert()
    .success()
    .stdout(predicate::str::contains("Test suite passed"));

  let log = env.runner_log();
  assert!(log.contains("PYTHONPATH=src\n"));
  assert!(log.contains("PYTHONDONTWRITEBYTECODE=1\n"));
  assert!(!log.contains("arg=--cov"));
}

#[test]
fn test_passes_extra_args_through() {
  let env = TestEnv::with_sources();
  env.fake_runner(0);

  env.zipship_cmd().args(["test", "--", "-k", "smoke"]).assert().success();

  let log = env.runner_log();
  assert!(log.contains("arg=-k\narg=smoke\n"));
}

#[test]
fn test_propagates_runner_exit_code() {
  let env = TestEnv::with_sources();
  env.fake_runner(3);

  env.zipship_cmd().arg("test").assert().code(3);
}

#[test]
fn test_cleans_first() {
  let env = TestEnv::with_sources();
  env.fake_runner(0);
  env.write_file(".coverage", "stale");

  env.zipship_cmd().arg("test").assert().success();

  assert!(!exists(&env.path(".coverage")));
}

#[test]
fn coverage_passes_coverage_flags() {
  let env = TestEnv::with_sources();
  env.fake_runner(0);
  env.write_file(".coveragerc", "[run]\nbranch = True\n");

  env.zipship_cmd().arg("test-with-coverage").assert().success();

  let log = env.runner_log();
  assert!(log.contains("arg=--cov=templates\n"));
  assert!(log.contains("arg=--cov-report=term-missing\n"));
  assert!(log.contains("arg=--cov-config=.coveragerc\n"));
}

#[test]
fn coverage_without_config_fails_before_running() {
  let env = TestEnv::with_sources();
  env.fake_runner(0);

  env
    .zipship_cmd()
    .arg("test-with-coverage")
    .assert()
    .failure()
    .stderr(predicate::str::contains(".coveragerc"));

  assert!(!exists(&env.path("runner.log")));
}

#[test]
fn run_executes_each_task_once() {
  let env = TestEnv::with_sources();
  env.fake_runner(0);

  let output = env
    .zipship_cmd()
    .args(["-o", "json", "run", "compile", "test"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["plan"], serde_json::json!(["clean", "compile", "test"]));
  assert!(exists(&env.path("target/templates")));
}

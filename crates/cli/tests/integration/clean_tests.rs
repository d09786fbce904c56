use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

use super::common::{TestEnv, exists};

fn dirty(env: &TestEnv) {
  env.write_file(".local-ci/log.txt", "ci");
  env.write_file("target/templates", "old build");
  env.write_file(".coverage", "data");
  env.write_file("src/templates/__init__.py", "x = 1\n");
  env.write_file("src/templates/__init__.pyc", "bytecode");
}

#[test]
fn clean_removes_artifacts() {
  let env = TestEnv::empty();
  dirty(&env);

  env
    .zipship_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 4 path(s)"));

  assert!(!exists(&env.path(".local-ci")));
  assert!(!exists(&env.path("target")));
  assert!(!exists(&env.path(".coverage")));
  assert!(!exists(&env.path("src/templates/__init__.pyc")));
  assert!(exists(&env.path("src/templates/__init__.py")));
}

#[test]
fn clean_on_clean_tree_succeeds() {
  let env = TestEnv::empty();

  env
    .zipship_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to clean"));

  env.zipship_cmd().arg("clean").assert().success();
}

#[test]
fn clean_dry_run_keeps_files() {
  let env = TestEnv::empty();
  dirty(&env);

  env
    .zipship_cmd()
    .args(["clean", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Dry run"))
    .stdout(predicate::str::contains(".coverage"));

  assert!(exists(&env.path("target/templates")));
  assert!(exists(&env.path(".coverage")));
}

#[test]
fn clean_json_reports_removed_paths() {
  let env = TestEnv::empty();
  env.write_file(".coverage", "data");

  let output = env.zipship_cmd().args(["-o", "json", "clean"]).output().unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["plan"], serde_json::json!(["clean"]));
  let removed = json["completed"][0]["removed"].as_array().unwrap();
  assert_eq!(removed.len(), 1);
  assert!(removed[0].as_str().unwrap().ends_with(".coverage"));
  assert!(json["failed"].is_null());
}

#[test]
fn clean_delete_error_exits_with_one() {
  let env = TestEnv::empty();
  env.write_file("plain-file", "not a directory");

  let mut cmd: Command = cargo_bin_cmd!("zipship");
  cmd
    .arg("-C")
    .arg(env.path("plain-file"))
    .arg("compile")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("clean failed"))
    .stderr(predicate::str::contains("plain-file"));
}

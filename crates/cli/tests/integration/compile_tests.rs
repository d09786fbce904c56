use std::io::Cursor;

use predicates::prelude::*;

use super::common::{TestEnv, exists};

fn entries(bytes: &[u8]) -> Vec<String> {
  let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
  let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
  names.sort();
  names
}

#[test]
fn compile_builds_executable_artifact() {
  let env = TestEnv::with_sources();

  env
    .zipship_cmd()
    .arg("compile")
    .assert()
    .success()
    .stdout(predicate::str::contains("Built target/templates"));

  let bytes = std::fs::read(env.path("target/templates")).unwrap();
  let shebang = b"#!/usr/bin/env python3\n";
  assert!(bytes.starts_with(shebang));
  assert_eq!(&bytes[shebang.len()..shebang.len() + 4], b"PK\x03\x04");

  let names = entries(&bytes);
  assert!(names.contains(&"__main__.py".to_string()));
  assert!(names.contains(&"templates/__init__.py".to_string()));
  assert!(names.contains(&"templates/template/template.py".to_string()));

  assert!(!exists(&env.path("target/templates.zip")));
}

#[cfg(unix)]
#[test]
fn compile_sets_mode_755() {
  use std::os::unix::fs::PermissionsExt;

  let env = TestEnv::with_sources();

  env.zipship_cmd().arg("compile").assert().success();

  let mode = std::fs::metadata(env.path("target/templates")).unwrap().permissions().mode();
  assert_eq!(mode & 0o777, 0o755);
}

#[test]
fn compile_cleans_first() {
  let env = TestEnv::with_sources();
  env.write_file(".coverage", "stale");
  env.write_file("target/leftover", "stale");

  env.zipship_cmd().arg("compile").assert().success();

  assert!(!exists(&env.path(".coverage")));
  assert!(!exists(&env.path("target/leftover")));
  assert!(exists(&env.path("target/templates")));
}

#[test]
fn compile_with_empty_src_produces_empty_archive() {
  let env = TestEnv::empty();
  std::fs::create_dir_all(env.path("src")).unwrap();

  env.zipship_cmd().arg("compile").assert().success();

  let bytes = std::fs::read(env.path("target/templates")).unwrap();
  assert!(entries(&bytes).is_empty());
}

#[test]
fn compile_without_src_fails() {
  let env = TestEnv::empty();

  env
    .zipship_cmd()
    .arg("compile")
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("compile failed"));
}

#[test]
fn compile_honours_name_and_python_flags() {
  let env = TestEnv::with_sources();

  env
    .zipship_cmd()
    .args(["--name", "app", "--python", "/opt/python/bin/python3.12", "compile"])
    .assert()
    .success();

  let bytes = std::fs::read(env.path("target/app")).unwrap();
  assert!(bytes.starts_with(b"#!/opt/python/bin/python3.12\n"));
}

#[test]
fn compile_honours_environment_overrides() {
  let env = TestEnv::with_sources();

  env
    .zipship_cmd()
    .env("ZIPSHIP_NAME", "from-env")
    .arg("compile")
    .assert()
    .success();

  assert!(exists(&env.path("target/from-env")));
}

#[test]
fn compile_is_deterministic() {
  let env = TestEnv::with_sources();

  env.zipship_cmd().arg("compile").assert().success();
  let first = std::fs::read(env.path("target/templates")).unwrap();
  env.zipship_cmd().arg("compile").assert().success();
  let second = std::fs::read(env.path("target/templates")).unwrap();

  assert_eq!(first, second);
}

//! Test utilities for zipship-lib.
//!
//! Helpers to lay out throwaway Python projects and stand-in test runners.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;

/// Write `files` (relative path, contents) under `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
  for (relative, contents) in files {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
  }
}

/// A small runnable package under `src/`.
pub fn sample_project(root: &Path) -> ProjectConfig {
  write_tree(
    root,
    &[
      ("src/__main__.py", "from templates import main\nmain()\n"),
      ("src/templates/__init__.py", "def main():\n    print('ok')\n"),
      ("src/templates/template/template.py", "class Template:\n    pass\n"),
    ],
  );
  ProjectConfig::with_root(root)
}

/// Returns a runner command that records its working directory, relevant
/// environment and arguments to `runner.log` in `dir`, then exits with `exit_code`.
#[cfg(unix)]
pub fn recording_runner(dir: &Path, exit_code: i32) -> (Vec<String>, PathBuf) {
  let script = dir.join("fake-runner.sh");
  let log = dir.join("runner.log");
  let body = format!(
    "#!/bin/sh\n\
     exec > '{log}'\n\
     echo \"cwd=$(pwd)\"\n\
     echo \"PYTHONPATH=$PYTHONPATH\"\n\
     echo \"PYTHONDONTWRITEBYTECODE=$PYTHONDONTWRITEBYTECODE\"\n\
     for arg in \"$@\"; do echo \"arg=$arg\"; done\n\
     exit {exit_code}\n",
    log = log.display(),
  );
  fs::write(&script, body).unwrap();
  (vec!["/bin/sh".to_string(), script.display().to_string()], log)
}

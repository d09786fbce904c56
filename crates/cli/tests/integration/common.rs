//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated project directory.
///
/// Each test gets its own temporary root; commands run against it via `-C`.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create an empty project.
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Create a project with a small runnable package under `src/`.
  pub fn with_sources() -> Self {
    let env = Self::empty();
    env.write_file("src/__main__.py", "from templates import main\nmain()\n");
    env.write_file("src/templates/__init__.py", "def main():\n    print('ok')\n");
    env.write_file("src/templates/template/template.py", "class Template:\n    pass\n");
    env
  }

  /// Canonical project root.
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Configure a `/bin/sh` test runner that records its environment and
  /// arguments to `runner.log`, then exits with `exit_code`.
  pub fn fake_runner(&self, exit_code: i32) {
    let log = self.root().join("runner.log");
    self.write_file(
      "fake-runner.sh",
      &format!(
        "exec > '{}'\n\
         echo \"PYTHONPATH=$PYTHONPATH\"\n\
         echo \"PYTHONDONTWRITEBYTECODE=$PYTHONDONTWRITEBYTECODE\"\n\
         for arg in \"$@\"; do echo \"arg=$arg\"; done\n\
         exit {}\n",
        log.display(),
        exit_code
      ),
    );
    self.write_file("zipship.toml", "[test]\nrunner = [\"/bin/sh\", \"fake-runner.sh\"]\n");
  }

  /// Contents of the fake runner's log.
  pub fn runner_log(&self) -> String {
    std::fs::read_to_string(self.path("runner.log")).unwrap()
  }

  /// Get a Command for the zipship binary pointed at this project.
  ///
  /// Clears `ZIPSHIP_*` variables so the host environment cannot leak in.
  pub fn zipship_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("zipship");
    cmd.arg("-C").arg(self.temp.path());
    cmd.env_remove("ZIPSHIP_PYTHON");
    cmd.env_remove("ZIPSHIP_NAME");
    cmd.env_remove("ZIPSHIP_SRC");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

pub fn exists(path: &Path) -> bool {
  std::fs::symlink_metadata(path).is_ok()
}

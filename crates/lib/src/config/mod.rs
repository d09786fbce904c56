//! Project configuration.
//!
//! Settings are layered from lowest to highest precedence:
//! 1. Built-in defaults
//! 2. `zipship.toml` in the project root (optional)
//! 3. `ZIPSHIP_PYTHON`, `ZIPSHIP_NAME` and `ZIPSHIP_SRC` environment variables
//! 4. Explicit overrides, usually from command-line flags
//!
//! The resulting [`ProjectConfig`] is passed explicitly to every operation;
//! nothing downstream reads the process environment or working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  ARCHIVE_EXTENSION, CONFIG_FILENAME, DEFAULT_COVERAGE_CONFIG, DEFAULT_COVERAGE_MODULE, DEFAULT_NAME, DEFAULT_PYTHON,
  DEFAULT_RUNNER, DEFAULT_SRC, NAME_ENV, PYTHON_ENV, SRC_ENV, TARGET_DIR,
};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("project directory {path} is not accessible: {source}")]
  Root {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("invalid configuration: {0}")]
  Invalid(String),
}

/// Configuration for a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
  /// Project root. Every relative path below resolves against it.
  #[serde(skip)]
  pub root: PathBuf,

  /// Interpreter named in the artifact's `#!` line.
  pub python: String,

  /// File name of the packaged artifact under `target/`.
  pub name: String,

  /// Source directory to package and to put on the module search path.
  pub src: PathBuf,

  pub test: TestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
  /// Runner command, e.g. `["pytest"]` or `["python3", "-m", "pytest"]`.
  pub runner: Vec<String>,

  /// Extra arguments appended to every runner invocation.
  pub args: Vec<String>,

  /// Module measured by `test-with-coverage`.
  pub coverage_module: String,

  /// Coverage configuration file, relative to the project root.
  pub coverage_config: PathBuf,
}

impl Default for TestConfig {
  fn default() -> Self {
    Self {
      runner: vec![DEFAULT_RUNNER.to_string()],
      args: Vec::new(),
      coverage_module: DEFAULT_COVERAGE_MODULE.to_string(),
      coverage_config: PathBuf::from(DEFAULT_COVERAGE_CONFIG),
    }
  }
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      python: DEFAULT_PYTHON.to_string(),
      name: DEFAULT_NAME.to_string(),
      src: PathBuf::from(DEFAULT_SRC),
      test: TestConfig::default(),
    }
  }
}

impl ProjectConfig {
  /// Create a default configuration rooted at `root`.
  pub fn with_root(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      ..Self::default()
    }
  }

  pub fn src_dir(&self) -> PathBuf {
    self.root.join(&self.src)
  }

  pub fn target_dir(&self) -> PathBuf {
    self.root.join(TARGET_DIR)
  }

  /// Path of the packaged, self-executing artifact.
  pub fn artifact_path(&self) -> PathBuf {
    self.target_dir().join(&self.name)
  }

  /// Path of the intermediate archive written before the `#!` line is prepended.
  pub fn archive_path(&self) -> PathBuf {
    self.target_dir().join(format!("{}.{}", self.name, ARCHIVE_EXTENSION))
  }

  pub fn coverage_config_path(&self) -> PathBuf {
    self.root.join(&self.test.coverage_config)
  }

  /// The interpreter directive line, including its trailing newline.
  pub fn shebang(&self) -> String {
    format!("#!{}\n", self.python)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let name = self.name.trim();
    if name.is_empty() {
      return Err(ConfigError::Invalid("name must not be empty".to_string()));
    }
    if name == "." || name == ".." || self.name.contains(['/', '\\']) {
      return Err(ConfigError::Invalid(format!(
        "name must be a plain file name, got {:?}",
        self.name
      )));
    }
    if self.python.trim().is_empty() {
      return Err(ConfigError::Invalid("python must not be empty".to_string()));
    }
    if self.python.contains(['\n', '\r']) {
      return Err(ConfigError::Invalid(
        "python must fit on a single line".to_string(),
      ));
    }
    if self.src.as_os_str().is_empty() {
      return Err(ConfigError::Invalid("src must not be empty".to_string()));
    }
    match self.test.runner.first() {
      Some(program) if !program.trim().is_empty() => {}
      _ => {
        return Err(ConfigError::Invalid(
          "test.runner must be a non-empty array".to_string(),
        ));
      }
    }
    if self.test.coverage_module.trim().is_empty() {
      return Err(ConfigError::Invalid(
        "test.coverage_module must not be empty".to_string(),
      ));
    }
    Ok(())
  }
}

/// Values that replace whatever the lower layers produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
  pub python: Option<String>,
  pub name: Option<String>,
  pub src: Option<PathBuf>,
}

impl ConfigOverrides {
  /// Read overrides from `ZIPSHIP_*` environment variables.
  ///
  /// Unset and empty variables are ignored.
  pub fn from_env() -> Self {
    Self {
      python: non_empty_var(PYTHON_ENV),
      name: non_empty_var(NAME_ENV),
      src: non_empty_var(SRC_ENV).map(PathBuf::from),
    }
  }

  pub fn apply(&self, config: &mut ProjectConfig) {
    if let Some(python) = &self.python {
      config.python = python.clone();
    }
    if let Some(name) = &self.name {
      config.name = name.clone();
    }
    if let Some(src) = &self.src {
      config.src = src.clone();
    }
  }
}

fn non_empty_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Read `zipship.toml` from `path`.
///
/// A missing file yields the defaults.
pub fn read_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
  if !path.exists() {
    debug!(path = %path.display(), "no config file, using defaults");
    return Ok(ProjectConfig::default());
  }
  let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  toml::from_str(&contents).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

/// Load the configuration for the project rooted at `root`.
///
/// `root` is canonicalized so reports and child processes see absolute paths.
pub fn load(root: &Path, overrides: &ConfigOverrides) -> Result<ProjectConfig, ConfigError> {
  let root = dunce::canonicalize(root).map_err(|source| ConfigError::Root {
    path: root.to_path_buf(),
    source,
  })?;

  let mut config = read_config_file(&root.join(CONFIG_FILENAME))?;
  config.root = root;
  ConfigOverrides::from_env().apply(&mut config);
  overrides.apply(&mut config);
  config.validate()?;

  debug!(
    root = %config.root.display(),
    python = %config.python,
    name = %config.name,
    src = %config.src.display(),
    "configuration loaded"
  );
  Ok(config)
}

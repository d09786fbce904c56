pub const APP_NAME: &str = "zipship";

/// Project configuration file, looked up in the project root.
pub const CONFIG_FILENAME: &str = "zipship.toml";

pub const PYTHON_ENV: &str = "ZIPSHIP_PYTHON";
pub const NAME_ENV: &str = "ZIPSHIP_NAME";
pub const SRC_ENV: &str = "ZIPSHIP_SRC";

pub const DEFAULT_PYTHON: &str = "/usr/bin/env python3";
pub const DEFAULT_NAME: &str = "templates";
pub const DEFAULT_SRC: &str = "src";
pub const DEFAULT_RUNNER: &str = "pytest";
pub const DEFAULT_COVERAGE_MODULE: &str = "templates";
pub const DEFAULT_COVERAGE_CONFIG: &str = ".coveragerc";

pub const LOCAL_CI_DIR: &str = ".local-ci";
pub const TARGET_DIR: &str = "target";
pub const COVERAGE_DATA_FILE: &str = ".coverage";

/// Extensions of interpreter-compiled cache files.
pub const BYTECODE_EXTENSIONS: &[&str] = &["pyc", "pyo"];
pub const BYTECODE_CACHE_DIR: &str = "__pycache__";

/// Module search path handed to the test runner.
pub const PYTHONPATH_ENV: &str = "PYTHONPATH";
/// Disables bytecode cache generation in the test runner.
pub const DONT_WRITE_BYTECODE_ENV: &str = "PYTHONDONTWRITEBYTECODE";

pub const ARCHIVE_EXTENSION: &str = "zip";
/// Module the interpreter runs when executing the packaged archive.
pub const ENTRY_POINT: &str = "__main__.py";

#[cfg(unix)]
pub const ARTIFACT_MODE: u32 = 0o755;

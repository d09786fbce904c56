//! Workspace cleanup.
//!
//! Removes the local CI scratch directory, the build output directory, the
//! coverage data file and every interpreter bytecode cache under the project
//! root. Cleaning is idempotent: paths that are already gone, or that vanish
//! while we work, are skipped rather than reported as errors.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::ProjectConfig;
use crate::consts::{BYTECODE_CACHE_DIR, BYTECODE_EXTENSIONS, COVERAGE_DATA_FILE, LOCAL_CI_DIR, TARGET_DIR};

#[derive(Debug, Error)]
pub enum CleanError {
  #[error("failed to scan {path}: {message}")]
  Scan { path: PathBuf, message: String },

  #[error("failed to delete {path}: {source}")]
  Delete {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
  /// Paths removed, or that would be removed on a dry run.
  pub removed: Vec<PathBuf>,
  pub bytes_freed: u64,
  pub dry_run: bool,
}

/// Remove all transient artifacts under the project root.
pub fn clean(config: &ProjectConfig, dry_run: bool) -> Result<CleanReport, CleanError> {
  let root = &config.root;
  let mut report = CleanReport {
    dry_run,
    ..Default::default()
  };

  let fixed = fixed_targets(root);
  for path in &fixed {
    sweep(path, dry_run, &mut report)?;
  }

  for path in bytecode_caches(root, &fixed)? {
    sweep(&path, dry_run, &mut report)?;
  }

  info!(
    removed = report.removed.len(),
    bytes_freed = report.bytes_freed,
    dry_run,
    "clean complete"
  );

  Ok(report)
}

fn fixed_targets(root: &Path) -> [PathBuf; 3] {
  [
    root.join(LOCAL_CI_DIR),
    root.join(TARGET_DIR),
    root.join(COVERAGE_DATA_FILE),
  ]
}

/// Find bytecode files and `__pycache__` directories under `root`.
///
/// Does not descend into `skip` (already swept) or into cache directories
/// (removed whole).
fn bytecode_caches(root: &Path, skip: &[PathBuf]) -> Result<Vec<PathBuf>, CleanError> {
  let mut found = Vec::new();
  let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter();

  while let Some(entry) = walker.next() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) if is_not_found(&e) => continue,
      Err(e) => {
        return Err(CleanError::Scan {
          path: e.path().unwrap_or(root).to_path_buf(),
          message: e.to_string(),
        });
      }
    };

    let path = entry.path();
    if entry.file_type().is_dir() {
      if skip.iter().any(|s| s == path) {
        walker.skip_current_dir();
      } else if entry.file_name() == BYTECODE_CACHE_DIR {
        found.push(path.to_path_buf());
        walker.skip_current_dir();
      }
    } else if is_bytecode(path) {
      found.push(path.to_path_buf());
    }
  }

  Ok(found)
}

pub(crate) fn is_bytecode(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| BYTECODE_EXTENSIONS.contains(&ext))
    .unwrap_or(false)
}

fn is_not_found(err: &walkdir::Error) -> bool {
  err.io_error().map(|e| e.kind() == io::ErrorKind::NotFound).unwrap_or(false)
}

/// Remove one path if it exists, recording it in the report.
fn sweep(path: &Path, dry_run: bool, report: &mut CleanReport) -> Result<(), CleanError> {
  let metadata = match fs::symlink_metadata(path) {
    Ok(m) => m,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
    Err(source) => {
      return Err(CleanError::Delete {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  let is_dir = metadata.file_type().is_dir();
  let size = if is_dir { dir_size(path) } else { metadata.len() };

  if !dry_run {
    let result = if is_dir {
      fs::remove_dir_all(path)
    } else {
      fs::remove_file(path)
    };
    match result {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
      Err(source) => {
        return Err(CleanError::Delete {
          path: path.to_path_buf(),
          source,
        });
      }
    }
  }

  debug!(path = %path.display(), bytes = size, dry_run, "removed");
  report.removed.push(path.to_path_buf());
  report.bytes_freed += size;
  Ok(())
}

fn dir_size(path: &Path) -> u64 {
  WalkDir::new(path)
    .into_iter()
    .filter_map(|e| e.ok())
    .filter(|e| e.file_type().is_file())
    .filter_map(|e| e.metadata().ok())
    .map(|m| m.len())
    .sum()
}

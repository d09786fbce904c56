//! Self-executing archive packaging.
//!
//! `package` turns the configured source directory into `target/<name>`:
//! a single `#!<interpreter>` line followed by the bytes of a zip archive
//! whose root is the source directory. An interpreter that can run zip
//! archives (such as Python with a root `__main__.py`) executes it directly.

pub mod archive;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ProjectConfig;
use crate::consts::ENTRY_POINT;
use crate::util::hash::{ContentHash, HashError, hash_file};

pub use archive::{ArchiveSummary, write_archive};

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("source directory not found: {0}")]
  SourceNotFound(PathBuf),

  #[error("source path is not a directory: {0}")]
  SourceNotDirectory(PathBuf),

  #[error("failed to walk {path}: {message}")]
  Walk { path: PathBuf, message: String },

  #[error("failed to archive {path}: {source}")]
  Archive {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("i/o error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Hash(#[from] HashError),
}

/// Outcome of a successful packaging run.
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
  pub artifact: PathBuf,
  pub interpreter: String,
  pub entries: usize,
  pub size_bytes: u64,
  pub sha256: ContentHash,
  pub has_entry_point: bool,
}

/// Package the source directory into the self-executing artifact.
///
/// Steps: create `target/`, archive the source tree to `target/<name>.zip`,
/// write the `#!` line plus the archive bytes to `target/<name>`, mark it
/// executable and remove the intermediate archive. Any failure aborts the
/// sequence; a partially written artifact is not cleaned up.
pub fn package(config: &ProjectConfig) -> Result<PackageReport, PackageError> {
  let src = config.src_dir();
  let metadata = match fs::metadata(&src) {
    Ok(m) => m,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(PackageError::SourceNotFound(src)),
    Err(source) => return Err(PackageError::Io { path: src, source }),
  };
  if !metadata.is_dir() {
    return Err(PackageError::SourceNotDirectory(src));
  }

  let target = config.target_dir();
  fs::create_dir_all(&target).map_err(|source| PackageError::Io {
    path: target.clone(),
    source,
  })?;

  let archive_path = config.archive_path();
  let summary = write_archive(&src, &archive_path, &target)?;
  if !summary.has_entry_point {
    warn!(
      src = %src.display(),
      "no {} at the archive root; the artifact will not run directly",
      ENTRY_POINT
    );
  }

  let artifact = config.artifact_path();
  let shebang = config.shebang();
  write_artifact(shebang.as_bytes(), &archive_path, &artifact)?;
  set_executable(&artifact)?;
  remove_file(&archive_path)?;

  let size_bytes = fs::metadata(&artifact)
    .map_err(|source| PackageError::Io {
      path: artifact.clone(),
      source,
    })?
    .len();
  let sha256 = hash_file(&artifact)?;

  info!(
    artifact = %artifact.display(),
    entries = summary.entries,
    size_bytes,
    sha256 = %sha256,
    "packaged"
  );

  Ok(PackageReport {
    artifact,
    interpreter: config.python.clone(),
    entries: summary.entries,
    size_bytes,
    sha256,
    has_entry_point: summary.has_entry_point,
  })
}

/// Write `header` followed by the contents of `archive` to `artifact`.
fn write_artifact(header: &[u8], archive: &Path, artifact: &Path) -> Result<(), PackageError> {
  let io_err = |path: &Path| {
    let path = path.to_path_buf();
    move |source: io::Error| PackageError::Io { path, source }
  };

  let mut out = BufWriter::new(File::create(artifact).map_err(io_err(artifact))?);
  out.write_all(header).map_err(io_err(artifact))?;
  let mut input = File::open(archive).map_err(io_err(archive))?;
  io::copy(&mut input, &mut out).map_err(io_err(artifact))?;
  out.flush().map_err(io_err(artifact))?;
  Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), PackageError> {
  use std::os::unix::fs::PermissionsExt;

  use crate::consts::ARTIFACT_MODE;

  fs::set_permissions(path, fs::Permissions::from_mode(ARTIFACT_MODE)).map_err(|source| PackageError::Io {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), PackageError> {
  Ok(())
}

fn remove_file(path: &Path) -> Result<(), PackageError> {
  match fs::remove_file(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(source) => Err(PackageError::Io {
      path: path.to_path_buf(),
      source,
    }),
  }
}

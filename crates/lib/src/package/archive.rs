//! Zip archive writer for source directories.
//!
//! Entries are written in file-name order with a fixed modification time, so
//! archiving the same tree twice produces identical bytes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::PackageError;
use crate::clean::is_bytecode;
use crate::consts::{BYTECODE_CACHE_DIR, ENTRY_POINT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
  /// Files and directories written.
  pub entries: usize,
  /// Whether the archive root holds the interpreter entry point.
  pub has_entry_point: bool,
}

/// Archive the contents of `src` into a new zip at `dest`.
///
/// The archive root is `src` itself. Bytecode caches, `dest` and anything
/// under `exclude` are skipped; symlinks are followed.
pub fn write_archive(src: &Path, dest: &Path, exclude: &Path) -> Result<ArchiveSummary, PackageError> {
  let file = File::create(dest).map_err(|source| PackageError::Io {
    path: dest.to_path_buf(),
    source,
  })?;
  let mut zip = ZipWriter::new(BufWriter::new(file));
  let mut summary = ArchiveSummary::default();

  let walker = WalkDir::new(src)
    .min_depth(1)
    .follow_links(true)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| !is_cache_entry(e) && !is_build_output(e.path(), dest, exclude));

  for entry in walker {
    let entry = entry.map_err(|e| PackageError::Walk {
      path: e.path().unwrap_or(src).to_path_buf(),
      message: e.to_string(),
    })?;
    let path = entry.path();
    let relative = path.strip_prefix(src).map_err(|_| PackageError::Walk {
      path: path.to_path_buf(),
      message: format!("entry is outside {}", src.display()),
    })?;
    let name = entry_name(relative);

    if entry.file_type().is_dir() {
      zip
        .add_directory(name.as_str(), entry_options(0o755))
        .map_err(|source| PackageError::Archive {
          path: path.to_path_buf(),
          source,
        })?;
    } else {
      let mode = if is_executable(&entry) { 0o755 } else { 0o644 };
      zip
        .start_file(name.as_str(), entry_options(mode))
        .map_err(|source| PackageError::Archive {
          path: path.to_path_buf(),
          source,
        })?;
      let mut input = File::open(path).map_err(|source| PackageError::Io {
        path: path.to_path_buf(),
        source,
      })?;
      io::copy(&mut input, &mut zip).map_err(|source| PackageError::Io {
        path: path.to_path_buf(),
        source,
      })?;
      if name == ENTRY_POINT {
        summary.has_entry_point = true;
      }
    }

    debug!(entry = %name, "archived");
    summary.entries += 1;
  }

  let mut writer = zip.finish().map_err(|source| PackageError::Archive {
    path: dest.to_path_buf(),
    source,
  })?;
  writer.flush().map_err(|source| PackageError::Io {
    path: dest.to_path_buf(),
    source,
  })?;

  Ok(summary)
}

fn entry_options(mode: u32) -> SimpleFileOptions {
  SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .last_modified_time(DateTime::default())
    .unix_permissions(mode)
}

fn is_cache_entry(entry: &walkdir::DirEntry) -> bool {
  if entry.file_type().is_dir() {
    entry.file_name() == BYTECODE_CACHE_DIR
  } else {
    is_bytecode(entry.path())
  }
}

fn is_build_output(path: &Path, dest: &Path, exclude: &Path) -> bool {
  path == dest || path.starts_with(exclude)
}

/// Zip entry names always use `/`, whatever the host separator.
fn entry_name(relative: &Path) -> String {
  relative
    .components()
    .filter_map(|c| match c {
      Component::Normal(part) => Some(part.to_string_lossy()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}

#[cfg(unix)]
fn is_executable(entry: &walkdir::DirEntry) -> bool {
  use std::os::unix::fs::PermissionsExt;
  entry
    .metadata()
    .map(|m| m.permissions().mode() & 0o111 != 0)
    .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_entry: &walkdir::DirEntry) -> bool {
  false
}

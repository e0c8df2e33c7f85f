//! Filesystem helpers for copying fetched packages into the build tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum FsError {
  #[error("failed to walk directory {path}: {source}")]
  WalkDir {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("destination already exists: {0}")]
  DestinationExists(PathBuf),

  #[error("failed to copy {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to create directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Copy the directory tree at `src` to a new directory `dst`.
///
/// `dst` must not exist yet. Symlinks are followed.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<(), FsError> {
  if dst.exists() {
    return Err(FsError::DestinationExists(dst.to_path_buf()));
  }

  for entry in WalkDir::new(src).follow_links(true) {
    let entry = entry.map_err(|source| FsError::WalkDir {
      path: src.to_path_buf(),
      source,
    })?;
    let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
    let target = dst.join(rel);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&target).map_err(|source| FsError::CreateDir { path: target, source })?;
    } else {
      copy_file(entry.path(), &target)?;
    }
  }

  Ok(())
}

/// Copy a single file, overwriting `to` if it exists.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FsError> {
  fs::copy(from, to).map(|_| ()).map_err(|source| FsError::Copy {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source,
  })
}

//! Filesystem operations used to assemble a snapshot.
//!
//! - [`merge_into`] layers one directory tree over another.
//! - [`apply_deletions`] removes the paths an update marks under `deleted/`.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum FsError {
  #[error("failed to walk {path}: {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to read directory {path}: {source}")]
  ReadDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to create directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to copy {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to remove {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Recursively copy `source` over `dest`.
///
/// Files are created or overwritten, missing directories are created, and
/// anything in `dest` without a counterpart in `source` is left alone. When
/// the kinds disagree (a file where the source has a directory or the other
/// way round) the source wins.
///
/// `skip` is consulted for the immediate children of `source` only; a
/// skipped child is not copied and not descended into.
///
/// Returns the number of files written.
pub fn merge_into<F>(source: &Path, dest: &Path, skip: F) -> Result<usize, FsError>
where
  F: Fn(&OsStr) -> bool,
{
  create_dir(dest)?;

  let walker = WalkDir::new(source)
    .min_depth(1)
    .follow_links(true)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.depth() != 1 || !skip(e.file_name()));

  let mut written = 0;
  for entry in walker {
    let entry = entry.map_err(|e| FsError::Walk {
      path: source.to_path_buf(),
      source: e,
    })?;
    let rel_path = entry.path().strip_prefix(source).unwrap_or(entry.path());
    let target = dest.join(rel_path);

    if entry.file_type().is_dir() {
      if target.exists() && !target.is_dir() {
        remove_path(&target)?;
      }
      create_dir(&target)?;
      continue;
    }

    if target.is_dir() {
      remove_path(&target)?;
    }
    if let Some(parent) = target.parent() {
      create_dir(parent)?;
    }

    trace!(file = %rel_path.display(), "copying");
    fs::copy(entry.path(), &target).map_err(|e| FsError::Copy {
      from: entry.path().to_path_buf(),
      to: target.clone(),
      source: e,
    })?;
    written += 1;
  }

  Ok(written)
}

/// Remove from `dest` every path marked under `markers`.
///
/// The marker tree mirrors `dest`:
/// - a marker file removes the target path, file or directory;
/// - an empty marker directory removes the target directory and everything in it;
/// - a non-empty marker directory is descended into and the target directory itself is kept.
///
/// Targets that do not exist are ignored. Returns the number of paths removed.
pub fn apply_deletions(markers: &Path, dest: &Path) -> Result<usize, FsError> {
  let mut removed = 0;

  for marker in sorted_children(markers)? {
    let Some(name) = marker.file_name() else {
      continue;
    };
    let target = dest.join(name);

    if marker.is_dir() && !sorted_children(&marker)?.is_empty() {
      if target.is_dir() {
        removed += apply_deletions(&marker, &target)?;
      }
      continue;
    }

    if remove_path(&target)? {
      debug!(path = %target.display(), "removed");
      removed += 1;
    }
  }

  Ok(removed)
}

/// Remove a file, symlink, or directory tree.
///
/// Returns `Ok(false)` when nothing exists at `path`.
pub fn remove_path(path: &Path) -> Result<bool, FsError> {
  let metadata = match fs::symlink_metadata(path) {
    Ok(metadata) => metadata,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(e) => {
      return Err(FsError::Remove {
        path: path.to_path_buf(),
        source: e,
      });
    }
  };

  if metadata.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  }
  .map_err(|e| FsError::Remove {
    path: path.to_path_buf(),
    source: e,
  })?;

  Ok(true)
}

fn create_dir(path: &Path) -> Result<(), FsError> {
  fs::create_dir_all(path).map_err(|e| FsError::CreateDir {
    path: path.to_path_buf(),
    source: e,
  })
}

fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>, FsError> {
  let read_err = |e: io::Error| FsError::ReadDir {
    path: dir.to_path_buf(),
    source: e,
  };

  let mut children = Vec::new();
  for entry in fs::read_dir(dir).map_err(read_err)? {
    children.push(entry.map_err(read_err)?.path());
  }
  children.sort();
  Ok(children)
}

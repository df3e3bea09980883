//! Theme snapshots.
//!
//! A [`Theme`] wraps one theme directory and knows how to list its versions
//! and rebuild its `latest/` snapshot. [`ThemeStore`] resolves theme ids
//! inside a themes directory.
//!
//! # Build
//!
//! 1. Discover update folders. None: nothing is touched.
//! 2. Validate every update folder. Failure: nothing is touched.
//! 3. Copy the base tree into a staging directory under `.themestack/`.
//! 4. For each update, oldest first: merge its files, apply its `deleted/`
//!    markers, fold its manifest.
//! 5. Write the accumulated `theme.json` into the staging directory.
//! 6. Replace `latest/` with the staging directory. The previous `latest/`
//!    is parked next to it and restored if the swap fails.

mod store;

pub use store::ThemeStore;

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::{BACKUP_DIR, DELETED_DIR, LATEST_DIR, MANIFEST_FILENAME, STAGING_PREFIX, UPDATES_DIR, WORK_DIR};
use crate::fsops::{FsError, apply_deletions, merge_into, remove_path};
use crate::manifest::{ManifestError, ThemeManifest};
use crate::version::{UpdateFolder, VersionError, discover_updates, sort_versions, validate_updates};

#[derive(Debug, Error)]
pub enum ThemeError {
  #[error("invalid theme id '{0}'")]
  InvalidThemeId(String),

  #[error("theme not found: {0}")]
  ThemeNotFound(String),

  #[error("failed to read themes directory {path}: {source}")]
  ReadThemes {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to create staging directory in {path}: {source}")]
  Stage {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to move snapshot into {path}: {source}")]
  Swap {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Version(#[from] VersionError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Fs(#[from] FsError),
}

/// What a build did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildOutcome {
  /// No update folders exist; `latest/` was not touched.
  NoUpdates,
  /// `latest/` was rebuilt.
  Rebuilt(BuildReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
  /// Version written into `latest/theme.json`.
  pub version: String,
  /// Update versions applied, in application order.
  pub applied: Vec<String>,
  /// Files written while copying the base and merging updates.
  pub files_written: usize,
  /// Paths removed by deletion markers.
  pub paths_removed: usize,
}

/// A theme directory on disk.
#[derive(Debug, Clone)]
pub struct Theme {
  root: PathBuf,
}

impl Theme {
  pub fn open(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.root.join(MANIFEST_FILENAME)
  }

  pub fn updates_dir(&self) -> PathBuf {
    self.root.join(UPDATES_DIR)
  }

  pub fn latest_dir(&self) -> PathBuf {
    self.root.join(LATEST_DIR)
  }

  /// Scratch space for builds. Removed again after a successful build.
  pub fn work_dir(&self) -> PathBuf {
    self.root.join(WORK_DIR)
  }

  /// Read the base `theme.json`.
  pub fn base_manifest(&self) -> Result<ThemeManifest, ThemeError> {
    Ok(ThemeManifest::load_versioned(&self.manifest_path())?)
  }

  /// Update folders, ascending by version.
  pub fn updates(&self) -> Result<Vec<UpdateFolder>, ThemeError> {
    Ok(discover_updates(&self.updates_dir())?)
  }

  /// Base version plus every update version, ascending.
  pub fn versions(&self) -> Result<Vec<String>, ThemeError> {
    let base = self.base_manifest()?;
    let mut versions = vec![base.version];
    versions.extend(self.updates()?.into_iter().map(|u| u.name));
    Ok(sort_versions(versions))
  }

  /// Version recorded in `latest/theme.json`, if a snapshot has been built.
  pub fn latest_version(&self) -> Result<Option<String>, ThemeError> {
    match ThemeManifest::load(&self.latest_dir().join(MANIFEST_FILENAME)) {
      Ok(manifest) => Ok(Some(manifest.version)),
      Err(ManifestError::NotFound { .. }) => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  /// Directory a consumer should copy theme files from: `latest/` once it
  /// exists, the theme root otherwise.
  pub fn effective_dir(&self) -> PathBuf {
    let latest = self.latest_dir();
    if latest.is_dir() { latest } else { self.root.clone() }
  }

  /// Rebuild `latest/` from the base tree and every update.
  ///
  /// Returns [`BuildOutcome::NoUpdates`] without touching the filesystem
  /// when there are no update folders. Validation errors are raised before
  /// anything is written, so an existing `latest/` survives them unchanged.
  pub fn build_latest(&self) -> Result<BuildOutcome, ThemeError> {
    let updates = self.updates()?;
    if updates.is_empty() {
      info!(theme = %self.root.display(), "no updates found, leaving latest untouched");
      return Ok(BuildOutcome::NoUpdates);
    }

    let validated = validate_updates(&updates)?;
    let mut manifest = self.base_manifest()?;

    info!(
      theme = %self.root.display(),
      base = %manifest.version,
      updates = validated.len(),
      "building latest snapshot"
    );

    let work = self.reset_work_dir()?;
    let staging = tempfile::Builder::new()
      .prefix(STAGING_PREFIX)
      .tempdir_in(&work)
      .map_err(|e| ThemeError::Stage { path: work.clone(), source: e })?;

    let mut report = BuildReport::default();
    report.files_written += merge_into(&self.root, staging.path(), is_reserved_root_entry)?;

    for update in &validated {
      let folder = &update.folder;
      let written = merge_into(&folder.path, staging.path(), is_update_metadata)?;

      let markers = folder.path.join(DELETED_DIR);
      let removed = if markers.is_dir() {
        apply_deletions(&markers, staging.path())?
      } else {
        0
      };

      manifest.apply_update(&update.manifest);

      debug!(version = %folder.name, written, removed, "applied update");
      report.files_written += written;
      report.paths_removed += removed;
      report.applied.push(folder.name.clone());
    }

    manifest.save(&staging.path().join(MANIFEST_FILENAME))?;
    report.version = manifest.version;

    // Dropping `staging` on an earlier error removes it; from here on it is ours to move.
    let staged = staging.keep();
    swap_dir(&staged, &self.latest_dir(), &work.join(BACKUP_DIR))?;

    if let Err(e) = fs::remove_dir(&work) {
      warn!(path = %work.display(), error = %e, "failed to remove work directory");
    }

    info!(version = %report.version, files = report.files_written, removed = report.paths_removed, "latest snapshot rebuilt");
    Ok(BuildOutcome::Rebuilt(report))
  }

  /// Empty the work directory, dropping anything an interrupted build left behind.
  fn reset_work_dir(&self) -> Result<PathBuf, ThemeError> {
    let work = self.work_dir();
    if remove_path(&work)? {
      debug!(path = %work.display(), "removed stale work directory");
    }
    fs::create_dir_all(&work).map_err(|e| ThemeError::Stage { path: work.clone(), source: e })?;
    Ok(work)
  }
}

/// Move `staged` to `target`, replacing whatever is there.
///
/// An existing `target` is first renamed to `backup`. If `staged` cannot be
/// moved into place the backup is renamed back, so `target` keeps its old
/// contents. `staged` is removed on failure.
fn swap_dir(staged: &Path, target: &Path, backup: &Path) -> Result<(), ThemeError> {
  let swap_error = |source: io::Error| ThemeError::Swap {
    path: target.to_path_buf(),
    source,
  };

  let had_target = target.symlink_metadata().is_ok();
  if had_target {
    remove_path(backup)?;
    if let Err(e) = fs::rename(target, backup) {
      discard(staged);
      return Err(swap_error(e));
    }
  }

  if let Err(e) = fs::rename(staged, target) {
    if had_target {
      if let Err(restore) = fs::rename(backup, target) {
        warn!(
          backup = %backup.display(),
          target = %target.display(),
          error = %restore,
          "failed to restore previous snapshot"
        );
      }
    }
    discard(staged);
    return Err(swap_error(e));
  }

  if had_target {
    discard(backup);
  }
  Ok(())
}

fn discard(path: &Path) {
  if let Err(e) = remove_path(path) {
    warn!(path = %path.display(), error = %e, "failed to clean up");
  }
}

/// Root entries that are not part of the theme payload.
fn is_reserved_root_entry(name: &OsStr) -> bool {
  name == UPDATES_DIR || name == LATEST_DIR || name == WORK_DIR
}

/// Entries of an update folder handled separately from the file merge.
fn is_update_metadata(name: &OsStr) -> bool {
  name == DELETED_DIR || name == MANIFEST_FILENAME
}

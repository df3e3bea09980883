//! Update discovery and validation.
//!
//! # Layout
//!
//! ```text
//! <theme>/updates/
//! ├── 1.1.0/
//! │   ├── theme.json      # "version" must equal the folder name
//! │   ├── assets/...      # files merged over the snapshot
//! │   └── deleted/...     # paths removed from the snapshot
//! └── 1.2.0/
//! ```
//!
//! The folder name is the source of truth for ordering. Entries that are not
//! directories or do not parse as semantic versions are ignored.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use semver::Version;
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::MANIFEST_FILENAME;
use crate::manifest::{ManifestError, ThemeManifest};

#[derive(Debug, Error)]
pub enum VersionError {
  #[error("failed to read updates directory {path}: {source}")]
  ReadUpdates {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("update {version}: missing theme.json at {path}")]
  MissingManifest { version: String, path: PathBuf },

  #[error("update {folder}: version mismatch (theme.json declares '{declared}')")]
  VersionMismatch { folder: String, declared: String },

  #[error("update {version}: {source}")]
  Manifest {
    version: String,
    #[source]
    source: ManifestError,
  },
}

/// A directory under `updates/` whose name is a semantic version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFolder {
  pub version: Version,
  /// Directory name, exactly as found on disk.
  pub name: String,
  pub path: PathBuf,
}

impl UpdateFolder {
  pub fn manifest_path(&self) -> PathBuf {
    self.path.join(MANIFEST_FILENAME)
  }
}

impl Ord for UpdateFolder {
  fn cmp(&self, other: &Self) -> Ordering {
    self.version.cmp(&other.version).then_with(|| self.name.cmp(&other.name))
  }
}

impl PartialOrd for UpdateFolder {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

/// An update folder whose manifest has been read and checked.
#[derive(Debug, Clone)]
pub struct ValidatedUpdate {
  pub folder: UpdateFolder,
  pub manifest: ThemeManifest,
}

/// Parse a directory name as a semantic version.
///
/// Accepts `MAJOR.MINOR.PATCH` with optional pre-release and build suffixes.
pub fn parse_version(name: &str) -> Option<Version> {
  Version::parse(name).ok()
}

/// List the update folders under `updates_dir`, ascending by version.
///
/// A missing `updates_dir` yields an empty list.
pub fn discover_updates(updates_dir: &Path) -> Result<Vec<UpdateFolder>, VersionError> {
  let entries = match fs::read_dir(updates_dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => {
      return Err(VersionError::ReadUpdates {
        path: updates_dir.to_path_buf(),
        source: e,
      });
    }
  };

  let mut folders = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|e| VersionError::ReadUpdates {
      path: updates_dir.to_path_buf(),
      source: e,
    })?;
    let path = entry.path();
    let name = entry.file_name().to_string_lossy().into_owned();

    if !path.is_dir() {
      debug!(entry = %name, "skipping non-directory in updates");
      continue;
    }

    match parse_version(&name) {
      Some(version) => folders.push(UpdateFolder { version, name, path }),
      None => warn!(entry = %name, "skipping update folder with non-semver name"),
    }
  }

  folders.sort();
  Ok(folders)
}

/// Check every update folder before anything is written.
///
/// Each folder must contain a `theme.json` whose `version` equals the
/// folder name. The first failing folder, in ascending order, is reported.
pub fn validate_updates(folders: &[UpdateFolder]) -> Result<Vec<ValidatedUpdate>, VersionError> {
  folders.iter().map(validate_update).collect()
}

fn validate_update(folder: &UpdateFolder) -> Result<ValidatedUpdate, VersionError> {
  let manifest_path = folder.manifest_path();

  let manifest = match ThemeManifest::load(&manifest_path) {
    Ok(manifest) => manifest,
    Err(ManifestError::NotFound { path }) => {
      return Err(VersionError::MissingManifest {
        version: folder.name.clone(),
        path,
      });
    }
    Err(e) => {
      return Err(VersionError::Manifest {
        version: folder.name.clone(),
        source: e,
      });
    }
  };

  if manifest.version != folder.name {
    return Err(VersionError::VersionMismatch {
      folder: folder.name.clone(),
      declared: manifest.version,
    });
  }

  Ok(ValidatedUpdate {
    folder: folder.clone(),
    manifest,
  })
}

/// Sort version strings ascending.
///
/// Strings that are not valid semantic versions sort first, in their
/// original relative order. Duplicates are removed.
pub fn sort_versions(versions: Vec<String>) -> Vec<String> {
  let mut seen = HashSet::new();
  let mut keyed: Vec<(Option<Version>, String)> = versions
    .into_iter()
    .filter(|v| seen.insert(v.clone()))
    .map(|v| (parse_version(&v), v))
    .collect();
  keyed.sort_by(|a, b| a.0.cmp(&b.0));
  keyed.into_iter().map(|(_, v)| v).collect()
}

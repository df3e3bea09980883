//! Theme lookup by id.
//!
//! # Layout
//!
//! ```text
//! {themes_dir}/
//! ├── aurora/
//! │   ├── theme.json
//! │   ├── updates/
//! │   └── latest/
//! └── minimal/
//!     └── theme.json
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::consts::MANIFEST_FILENAME;
use crate::platform::paths::themes_dir;

use super::{BuildOutcome, Theme, ThemeError};

/// Themes directory holding one sub-directory per theme id.
#[derive(Debug, Clone)]
pub struct ThemeStore {
  base_path: PathBuf,
}

impl ThemeStore {
  pub fn new(base_path: PathBuf) -> Self {
    Self { base_path }
  }

  /// Store at the configured location (see [`themes_dir`]).
  pub fn default_store() -> Self {
    Self::new(themes_dir())
  }

  pub fn base_path(&self) -> &Path {
    &self.base_path
  }

  /// Resolve a theme id to an existing theme directory.
  ///
  /// Ids are single path components; anything that could escape the store
  /// is rejected.
  pub fn theme(&self, theme_id: &str) -> Result<Theme, ThemeError> {
    if !is_valid_theme_id(theme_id) {
      return Err(ThemeError::InvalidThemeId(theme_id.to_string()));
    }

    let root = self.base_path.join(theme_id);
    if !root.is_dir() {
      return Err(ThemeError::ThemeNotFound(theme_id.to_string()));
    }
    Ok(Theme::open(root))
  }

  /// Ids of all directories in the store that hold a `theme.json`, sorted.
  ///
  /// A missing store directory yields an empty list.
  pub fn list_themes(&self) -> Result<Vec<String>, ThemeError> {
    let entries = match fs::read_dir(&self.base_path) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => {
        return Err(ThemeError::ReadThemes {
          path: self.base_path.clone(),
          source: e,
        });
      }
    };

    let mut ids = Vec::new();
    for entry in entries {
      let entry = entry.map_err(|e| ThemeError::ReadThemes {
        path: self.base_path.clone(),
        source: e,
      })?;
      if !entry.path().join(MANIFEST_FILENAME).is_file() {
        continue;
      }
      match entry.file_name().into_string() {
        Ok(id) => ids.push(id),
        Err(name) => debug!(name = ?name, "skipping theme directory with non UTF-8 name"),
      }
    }
    ids.sort();
    Ok(ids)
  }

  /// Base version plus every update version of a theme, ascending.
  pub fn theme_versions(&self, theme_id: &str) -> Result<Vec<String>, ThemeError> {
    self.theme(theme_id)?.versions()
  }

  /// Rebuild (or leave alone) a theme's `latest/` snapshot.
  pub fn build_latest_snapshot(&self, theme_id: &str) -> Result<BuildOutcome, ThemeError> {
    self.theme(theme_id)?.build_latest()
  }

  /// Directory to copy a theme's files from when creating a project.
  pub fn effective_dir(&self, theme_id: &str) -> Result<PathBuf, ThemeError> {
    Ok(self.theme(theme_id)?.effective_dir())
  }
}

fn is_valid_theme_id(theme_id: &str) -> bool {
  let mut components = Path::new(theme_id).components();
  matches!(
    (components.next(), components.next()),
    (Some(Component::Normal(name)), None) if name == theme_id
  )
}

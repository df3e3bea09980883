use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::settings::fold_settings;

/// Setting groups keyed by group name (e.g. `colors`, `layout`), in the
/// order the manifest declares them.
pub type SettingGroups = IndexMap<String, Vec<SettingDef>>;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("manifest not found: {path}")]
  NotFound { path: PathBuf },

  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse manifest {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("manifest {path} does not declare a version")]
  MissingVersion { path: PathBuf },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to write manifest {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A single setting definition inside a group.
///
/// Only `id` is interpreted; `label`, `default`, `type` and anything else
/// are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingDef {
  pub id: String,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl SettingDef {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      fields: Map::new(),
    }
  }

  /// Builder-style helper for attaching a field.
  pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
    self.fields.insert(key.to_string(), value.into());
    self
  }

  pub fn default_value(&self) -> Option<&Value> {
    self.fields.get("default")
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeSettings {
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub global: SettingGroups,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl ThemeSettings {
  pub fn is_empty(&self) -> bool {
    self.global.is_empty() && self.extra.is_empty()
  }
}

/// Contents of a `theme.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeManifest {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default)]
  pub version: String,
  #[serde(default, skip_serializing_if = "ThemeSettings::is_empty")]
  pub settings: ThemeSettings,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl ThemeManifest {
  /// Load a manifest from disk.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(ManifestError::NotFound {
          path: path.to_path_buf(),
        });
      }
      Err(e) => {
        return Err(ManifestError::Read {
          path: path.to_path_buf(),
          source: e,
        });
      }
    };

    serde_json::from_str(&content).map_err(|e| ManifestError::Parse {
      path: path.to_path_buf(),
      source: e,
    })
  }

  /// Load a manifest that must declare a non-empty `version`.
  pub fn load_versioned(path: &Path) -> Result<Self, ManifestError> {
    let manifest = Self::load(path)?;
    if manifest.version.is_empty() {
      return Err(ManifestError::MissingVersion {
        path: path.to_path_buf(),
      });
    }
    Ok(manifest)
  }

  /// Write the manifest as pretty-printed JSON with a trailing newline.
  pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
    let mut content = serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)?;
    content.push('\n');
    fs::write(path, content).map_err(|e| ManifestError::Write {
      path: path.to_path_buf(),
      source: e,
    })
  }

  /// Fold an update's manifest into this one.
  ///
  /// `version` becomes the update's version, `settings.global` is
  /// accumulated per setting id, and any other top-level or settings field
  /// the update declares replaces the current value.
  pub fn apply_update(&mut self, update: &ThemeManifest) {
    self.version = update.version.clone();

    if let Some(name) = &update.name {
      self.name = Some(name.clone());
    }

    for (key, value) in &update.extra {
      self.extra.insert(key.clone(), value.clone());
    }

    for (key, value) in &update.settings.extra {
      self.settings.extra.insert(key.clone(), value.clone());
    }

    fold_settings(&mut self.settings.global, &update.settings.global);
  }
}

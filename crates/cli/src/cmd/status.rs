//! Status command implementation.
//!
//! Shows a theme's base version, the version recorded in `latest/`, and how
//! many updates exist.

use anyhow::{Context, Result};
use serde::Serialize;
use themestack_lib::theme::ThemeStore;
use themestack_lib::util::hash::{ContentHash, hash_directory};

use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success};

#[derive(Serialize)]
struct StatusOutput {
  theme: String,
  base_version: String,
  latest_version: Option<String>,
  available_version: String,
  updates: usize,
  up_to_date: bool,
  latest_digest: Option<ContentHash>,
}

pub fn cmd_status(store: &ThemeStore, theme_id: &str, output: OutputFormat) -> Result<()> {
  let theme = store.theme(theme_id)?;
  let context = || format!("Failed to read status of theme '{}'", theme_id);

  let base = theme.base_manifest().with_context(context)?;
  let updates = theme.updates().with_context(context)?;
  let latest_version = theme.latest_version().with_context(context)?;

  let available_version = updates
    .last()
    .map(|u| u.name.clone())
    .unwrap_or_else(|| base.version.clone());
  let up_to_date = updates.is_empty() || latest_version.as_deref() == Some(available_version.as_str());

  let latest_digest = match latest_version {
    Some(_) => Some(hash_directory(&theme.latest_dir()).context("Failed to hash latest snapshot")?),
    None => None,
  };

  let status = StatusOutput {
    theme: theme_id.to_string(),
    base_version: base.version,
    latest_version,
    available_version,
    updates: updates.len(),
    up_to_date,
    latest_digest,
  };

  if output.is_json() {
    return print_json(&status);
  }

  print_success(&format!("Theme: {}", status.theme));
  print_stat("Base", &status.base_version);
  print_stat("Updates", &status.updates.to_string());
  print_stat("Latest", status.latest_version.as_deref().unwrap_or("(not built)"));
  if let Some(digest) = &status.latest_digest {
    print_stat("Digest", digest.short());
  }

  if !status.up_to_date {
    println!();
    print_info(&format!(
      "Version {} available. Run 'themestack build {}' to rebuild latest/.",
      status.available_version, status.theme
    ));
  }

  Ok(())
}

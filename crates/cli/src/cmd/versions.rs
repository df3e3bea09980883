//! Implementation of the `themestack versions` command.

use anyhow::{Context, Result};
use themestack_lib::theme::ThemeStore;

use crate::output::{OutputFormat, print_json};

/// Print the base version followed by every update version, ascending.
pub fn cmd_versions(store: &ThemeStore, theme_id: &str, output: OutputFormat) -> Result<()> {
  let versions = store
    .theme_versions(theme_id)
    .with_context(|| format!("Failed to read versions of theme '{}'", theme_id))?;

  if output.is_json() {
    return print_json(&versions);
  }

  for version in &versions {
    println!("{}", version);
  }
  Ok(())
}

//! Implementation of the `themestack list` command.

use anyhow::{Context, Result};
use serde::Serialize;
use themestack_lib::theme::ThemeStore;

use crate::output::{OutputFormat, print_info, print_json};

pub fn cmd_list(store: &ThemeStore, output: OutputFormat) -> Result<()> {
  let themes = store.list_themes().context("Failed to list themes")?;

  if output.is_json() {
    #[derive(Serialize)]
    struct ListOutput<'a> {
      themes_dir: String,
      themes: &'a [String],
    }

    return print_json(&ListOutput {
      themes_dir: store.base_path().display().to_string(),
      themes: &themes,
    });
  }

  if themes.is_empty() {
    print_info(&format!("No themes found in {}", store.base_path().display()));
    return Ok(());
  }

  for theme in &themes {
    println!("{}", theme);
  }
  print_info(&format!("{} theme(s) total", themes.len()));

  Ok(())
}

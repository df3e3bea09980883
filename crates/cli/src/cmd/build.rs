//! Implementation of the `themestack build` command.
//!
//! Rebuilds a theme's `latest/` snapshot from its base tree and every
//! update folder.

use std::time::Instant;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use themestack_lib::theme::{BuildOutcome, BuildReport, ThemeStore};
use themestack_lib::util::hash::{ContentHash, hash_directory};
use tracing::debug;

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success, print_warning, symbols};

#[derive(Serialize)]
struct BuildOutput<'a> {
  theme: &'a str,
  #[serde(flatten)]
  outcome: &'a BuildOutcome,
  #[serde(skip_serializing_if = "Option::is_none")]
  digest: Option<ContentHash>,
}

/// Execute the build command.
///
/// Validation failures (missing `theme.json` in an update, version mismatch)
/// are reported as errors and leave any existing snapshot untouched.
pub fn cmd_build(store: &ThemeStore, theme_id: &str, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let theme = store.theme(theme_id)?;

  let outcome = theme
    .build_latest()
    .with_context(|| format!("Failed to build theme '{}'", theme_id))?;

  let digest = match &outcome {
    BuildOutcome::Rebuilt(_) => Some(hash_directory(&theme.latest_dir()).context("Failed to hash latest snapshot")?),
    BuildOutcome::NoUpdates => None,
  };
  debug!(elapsed = ?start.elapsed(), "build finished");

  if output.is_json() {
    return print_json(&BuildOutput {
      theme: theme_id,
      outcome: &outcome,
      digest,
    });
  }

  match &outcome {
    BuildOutcome::NoUpdates => {
      print_warning(&format!("Theme '{}' has no updates; latest/ left untouched", theme_id));
    }
    BuildOutcome::Rebuilt(report) => {
      print_report(theme_id, report);
      if let Some(digest) = &digest {
        print_stat("Digest", digest.short());
      }
      print_stat("Duration", &format_duration(start.elapsed()));
    }
  }

  Ok(())
}

fn print_report(theme_id: &str, report: &BuildReport) {
  print_success(&format!("Built {} {} {}", theme_id, symbols::ARROW, report.version));
  for version in &report.applied {
    println!("  {} {}", symbols::INFO.dimmed(), version);
  }
  print_stat("Files written", &report.files_written.to_string());
  print_stat("Paths removed", &report.paths_removed.to_string());
}

mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// themestack - layer theme updates into a `latest/` snapshot
#[derive(Parser)]
#[command(name = "themestack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Themes directory (defaults to $THEMESTACK_THEMES_DIR, then the data directory)
  #[arg(long, global = true, value_name = "PATH")]
  themes_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List themes in the themes directory
  List {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show the base version and every update version, ascending
  Versions {
    /// Theme id
    theme: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Rebuild the theme's latest/ snapshot
  Build {
    /// Theme id
    theme: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show base, latest and pending versions of a theme
  Status {
    /// Theme id
    theme: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let store = cmd::open_store(cli.themes_dir.as_deref());

  let result = match cli.command {
    Commands::List { output } => cmd::cmd_list(&store, output),
    Commands::Versions { theme, output } => cmd::cmd_versions(&store, &theme, output),
    Commands::Build { theme, output } => cmd::cmd_build(&store, &theme, output),
    Commands::Status { theme, output } => cmd::cmd_status(&store, &theme, output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

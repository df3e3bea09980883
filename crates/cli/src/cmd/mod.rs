mod build;
mod list;
mod status;
mod versions;

use std::path::Path;

use themestack_lib::theme::ThemeStore;

pub use build::cmd_build;
pub use list::cmd_list;
pub use status::cmd_status;
pub use versions::cmd_versions;

/// Open the theme store, preferring an explicit `--themes-dir`.
pub fn open_store(themes_dir: Option<&Path>) -> ThemeStore {
  match themes_dir {
    Some(dir) => ThemeStore::new(dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())),
    None => ThemeStore::default_store(),
  }
}

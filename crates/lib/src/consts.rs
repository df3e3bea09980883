/// Application name, used for platform data directories.
pub const APP_NAME: &str = "themestack";

/// Manifest file at the root of a theme and of every update folder.
pub const MANIFEST_FILENAME: &str = "theme.json";

/// Directory holding one sub-directory per update version.
pub const UPDATES_DIR: &str = "updates";

/// Generated snapshot directory.
pub const LATEST_DIR: &str = "latest";

/// Deletion marker tree inside an update folder.
pub const DELETED_DIR: &str = "deleted";

/// Hidden work directory inside a theme root. Never part of the payload.
pub const WORK_DIR: &str = ".themestack";

/// Prefix of the directory inside [`WORK_DIR`] a snapshot is assembled in.
pub const STAGING_PREFIX: &str = "latest-";

/// Name the previous `latest/` is parked under inside [`WORK_DIR`] while a
/// new snapshot is swapped in.
pub const BACKUP_DIR: &str = "previous";

/// Environment variable overriding the themes directory.
pub const THEMES_DIR_ENV: &str = "THEMESTACK_THEMES_DIR";

//! themestack-lib: version layering for website themes
//!
//! A theme is a directory holding a base `theme.json`, an opaque payload of
//! templates and assets, and an `updates/` folder with one sub-directory per
//! semantic version. This crate folds those updates over the base and
//! materializes the result as a `latest/` snapshot:
//! - `version`: update discovery, ordering and validation
//! - `fsops`: directory merging and deletion markers
//! - `settings`: accumulation of the settings schema across versions
//! - `theme`: the snapshot builder and the theme store

pub mod consts;
pub mod fsops;
pub mod manifest;
pub mod platform;
pub mod settings;
pub mod theme;
pub mod util;
pub mod version;

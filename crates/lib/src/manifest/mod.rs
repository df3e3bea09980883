//! Theme manifest (`theme.json`) types.
//!
//! The builder only interprets `version` and `settings.global`; every other
//! field is carried through opaquely so the generated manifest stays
//! readable by the rest of the site builder.

mod types;

pub use types::*;

//! Settings schema accumulation.
//!
//! Each theme version may declare `settings.global`, a map of named groups
//! holding ordered setting definitions. Versions are folded oldest first:
//! a definition whose `id` already exists in the group replaces it at the
//! same position, an unseen `id` is appended, and unseen groups are created.

use tracing::trace;

use crate::manifest::SettingGroups;

/// Fold `update` into `acc` in place.
pub fn fold_settings(acc: &mut SettingGroups, update: &SettingGroups) {
  for (group_name, defs) in update {
    let group = acc.entry(group_name.clone()).or_default();

    for def in defs {
      match group.iter().position(|existing| existing.id == def.id) {
        Some(index) => {
          trace!(group = %group_name, id = %def.id, "replacing setting");
          group[index] = def.clone();
        }
        None => {
          trace!(group = %group_name, id = %def.id, "adding setting");
          group.push(def.clone());
        }
      }
    }
  }
}

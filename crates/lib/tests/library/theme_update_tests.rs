use std::fs;

use serde_json::json;
use themestack_lib::theme::{BuildOutcome, ThemeError};
use themestack_lib::util::hash::hash_directory;
use themestack_lib::version::VersionError;

use super::common::{ThemeFixture, group_ids, read_tree};

// =============================================================================
// Rejection leaves the filesystem alone
// =============================================================================

#[test]
fn missing_update_manifest_is_rejected() {
  let fixture = ThemeFixture::base();
  fixture.write("updates/1.1.0/assets/base.css", "v1.1.0");

  let err = fixture.theme().build_latest().unwrap_err();

  assert!(matches!(err, ThemeError::Version(VersionError::MissingManifest { .. })));
  assert!(err.to_string().contains("missing theme.json"));
  assert!(!fixture.latest("").exists());
}

#[test]
fn version_mismatch_is_rejected() {
  let fixture = ThemeFixture::base();
  fixture.write_json("updates/1.1.0/theme.json", &json!({ "version": "1.2.0" }));

  let err = fixture.theme().build_latest().unwrap_err();

  assert!(matches!(err, ThemeError::Version(VersionError::VersionMismatch { .. })));
  assert!(err.to_string().contains("version mismatch"));
  assert!(!fixture.latest("").exists());
}

#[test]
fn rejection_keeps_existing_latest_byte_for_byte() {
  let fixture = ThemeFixture::with_two_updates();
  fixture.theme().build_latest().unwrap();
  let before = read_tree(&fixture.latest(""));

  // A later, broken update: valid folder name but wrong declared version.
  fixture.write_json("updates/1.3.0/theme.json", &json!({ "version": "1.3.1" }));
  fixture.write("updates/1.3.0/assets/base.css", "v1.3.0");

  assert!(fixture.theme().build_latest().is_err());
  assert_eq!(read_tree(&fixture.latest("")), before);
}

#[test]
fn rejection_checks_all_folders_before_writing() {
  let fixture = ThemeFixture::with_two_updates();
  fixture.theme().build_latest().unwrap();
  let before = read_tree(&fixture.latest(""));

  // The first update is fine; the broken one sorts last.
  fs::remove_file(fixture.path("updates/1.2.0/theme.json")).unwrap();

  let err = fixture.theme().build_latest().unwrap_err();
  assert!(err.to_string().contains("missing theme.json"));
  assert_eq!(read_tree(&fixture.latest("")), before);
}

// =============================================================================
// No updates
// =============================================================================

#[test]
fn empty_updates_dir_creates_no_latest() {
  let fixture = ThemeFixture::base();
  fs::create_dir_all(fixture.path("updates")).unwrap();

  assert_eq!(fixture.theme().build_latest().unwrap(), BuildOutcome::NoUpdates);
  assert!(!fixture.latest("").exists());
}

#[test]
fn missing_updates_dir_creates_no_latest() {
  let fixture = ThemeFixture::base();

  assert_eq!(fixture.theme().build_latest().unwrap(), BuildOutcome::NoUpdates);
  assert!(!fixture.latest("").exists());
}

// =============================================================================
// Application order
// =============================================================================

#[test]
fn updates_apply_in_ascending_version_order() {
  let fixture = ThemeFixture::base();
  // Created out of order, and with names that sort the wrong way as strings.
  for version in ["1.10.0", "1.2.0", "1.9.0"] {
    fixture.write_json(&format!("updates/{}/theme.json", version), &json!({ "version": version }));
    fixture.write(&format!("updates/{}/assets/base.css", version), version);
    fixture.write(&format!("updates/{}/history/{}.txt", version, version), version);
  }

  let BuildOutcome::Rebuilt(report) = fixture.theme().build_latest().unwrap() else {
    panic!("expected a rebuild");
  };

  assert_eq!(report.applied, ["1.2.0", "1.9.0", "1.10.0"]);
  assert_eq!(report.version, "1.10.0");
  assert_eq!(fixture.read_latest("assets/base.css"), "1.10.0");
  for version in ["1.2.0", "1.9.0", "1.10.0"] {
    assert!(fixture.latest(&format!("history/{}.txt", version)).exists());
  }
}

#[test]
fn later_update_sees_earlier_update_changes() {
  let fixture = ThemeFixture::base();
  fixture.write_json("updates/1.1.0/theme.json", &json!({ "version": "1.1.0" }));
  fixture.write("updates/1.1.0/assets/temp.js", "added in 1.1.0");
  fixture.write_json("updates/1.2.0/theme.json", &json!({ "version": "1.2.0" }));
  fixture.write("updates/1.2.0/deleted/assets/temp.js", "");

  fixture.theme().build_latest().unwrap();

  assert!(!fixture.latest("assets/temp.js").exists());
}

#[test]
fn deletion_then_readd_in_later_update() {
  let fixture = ThemeFixture::base();
  fixture.write_json("updates/1.1.0/theme.json", &json!({ "version": "1.1.0" }));
  fixture.write("updates/1.1.0/deleted/snippets/header.liquid", "");
  fixture.write_json("updates/1.2.0/theme.json", &json!({ "version": "1.2.0" }));
  fixture.write("updates/1.2.0/snippets/header.liquid", "v1.2.0");

  fixture.theme().build_latest().unwrap();

  assert_eq!(fixture.read_latest("snippets/header.liquid"), "v1.2.0");
}

#[test]
fn same_update_adds_then_deletes_its_own_file() {
  // Within one update the file merge runs before deletions.
  let fixture = ThemeFixture::base();
  fixture.write_json("updates/1.1.0/theme.json", &json!({ "version": "1.1.0" }));
  fixture.write("updates/1.1.0/assets/base.css", "v1.1.0");
  fixture.write("updates/1.1.0/deleted/assets/base.css", "");

  fixture.theme().build_latest().unwrap();

  assert!(!fixture.latest("assets/base.css").exists());
}

// =============================================================================
// File merge and deletion
// =============================================================================

#[test]
fn overwrite_addition_and_preservation() {
  let fixture = ThemeFixture::with_two_updates();
  fixture.theme().build_latest().unwrap();

  assert_eq!(fixture.read_latest("assets/base.css"), "v1.1.0");
  assert_eq!(fixture.read_latest("snippets/header.liquid"), "v1.0.0");
  assert_eq!(fixture.read_latest("assets/new-feature.js"), "v1.1.0");
  assert_eq!(fixture.read_latest("layout.liquid"), "v1.0.0");
}

#[test]
fn file_deletion_keeps_siblings() {
  let fixture = ThemeFixture::with_two_updates();
  fixture.theme().build_latest().unwrap();

  assert!(!fixture.latest("assets/deprecated.css").exists());
  assert!(fixture.latest("assets").is_dir());
  assert!(fixture.latest("assets/base.css").exists());
}

#[test]
fn directory_deletion_keeps_parent() {
  let fixture = ThemeFixture::with_two_updates();
  fixture.theme().build_latest().unwrap();

  assert!(!fixture.latest("widgets/deprecated-widget").exists());
  assert!(fixture.latest("widgets").is_dir());
  assert!(fixture.latest("widgets/hero/widget.liquid").exists());
}

#[test]
fn snapshot_contains_no_update_folders() {
  let fixture = ThemeFixture::with_two_updates();
  fixture.theme().build_latest().unwrap();

  assert!(!fixture.latest("updates").exists());
  assert!(!fixture.latest("deleted").exists());
  assert!(!fixture.latest("latest").exists());
}

#[test]
fn inputs_are_not_modified() {
  let fixture = ThemeFixture::with_two_updates();
  let updates_before = read_tree(&fixture.path("updates"));
  let base_css_before = fs::read(fixture.path("assets/base.css")).unwrap();

  fixture.theme().build_latest().unwrap();

  assert_eq!(read_tree(&fixture.path("updates")), updates_before);
  assert_eq!(fs::read(fixture.path("assets/base.css")).unwrap(), base_css_before);
  assert!(fixture.path("assets/deprecated.css").exists());
}

// =============================================================================
// Settings accumulation
// =============================================================================

#[test]
fn settings_accumulate_across_versions() {
  let fixture = ThemeFixture::with_two_updates();
  fixture.theme().build_latest().unwrap();

  let manifest = fixture.latest_manifest();

  assert_eq!(manifest["version"], "1.2.0");
  assert_eq!(manifest["name"], "Aurora");
  assert_eq!(
    group_ids(&manifest, "colors"),
    ["primary", "secondary", "accent", "background"]
  );
  assert_eq!(group_ids(&manifest, "layout"), ["max_width", "container_padding"]);

  let colors = &manifest["settings"]["global"]["colors"];
  assert_eq!(colors[0]["default"], "#1a73e8");
  assert_eq!(colors[1]["default"], "#666666");
}

#[test]
fn settings_keep_declared_group_and_field_order() {
  let fixture = ThemeFixture::base();
  fixture.write_json(
    "theme.json",
    &json!({
      "name": "Aurora",
      "version": "1.0.0",
      "settings": {
        "global": {
          "typography": [
            { "id": "body_font", "type": "font", "label": "Body font", "default": "Inter" }
          ],
          "colors": [
            { "id": "primary", "type": "color", "label": "Primary", "default": "#000000" }
          ]
        }
      }
    }),
  );
  fixture.write_update_manifest(
    "1.1.0",
    json!({
      "spacing": [{ "id": "gap", "label": "Gap", "default": 8 }],
      "colors": [{ "id": "accent", "label": "Accent", "default": "#ff9800" }]
    }),
  );

  fixture.theme().build_latest().unwrap();

  let manifest = fixture.latest_manifest();
  let global = manifest["settings"]["global"].as_object().unwrap();
  let groups: Vec<&str> = global.keys().map(String::as_str).collect();
  assert_eq!(groups, ["typography", "colors", "spacing"]);

  let font = manifest["settings"]["global"]["typography"][0].as_object().unwrap();
  let fields: Vec<&str> = font.keys().map(String::as_str).collect();
  assert_eq!(fields, ["id", "type", "label", "default"]);
  assert_eq!(group_ids(&manifest, "colors"), ["primary", "accent"]);
}

#[test]
fn base_manifest_is_not_modified() {
  let fixture = ThemeFixture::with_two_updates();
  let before = fs::read(fixture.path("theme.json")).unwrap();

  fixture.theme().build_latest().unwrap();

  assert_eq!(fs::read(fixture.path("theme.json")).unwrap(), before);
}

#[test]
fn update_without_settings_only_bumps_version() {
  let fixture = ThemeFixture::base();
  fixture.write_json("updates/1.0.1/theme.json", &json!({ "version": "1.0.1" }));

  fixture.theme().build_latest().unwrap();

  let manifest = fixture.latest_manifest();
  assert_eq!(manifest["version"], "1.0.1");
  assert_eq!(group_ids(&manifest, "colors"), ["primary", "secondary"]);
  assert_eq!(manifest["settings"]["global"]["colors"][0]["default"], "#000000");
}

// =============================================================================
// Versions
// =============================================================================

#[test]
fn versions_are_base_then_updates_ascending() {
  let fixture = ThemeFixture::with_two_updates();
  assert_eq!(fixture.theme().versions().unwrap(), ["1.0.0", "1.1.0", "1.2.0"]);
}

#[test]
fn versions_ignore_non_semver_folders() {
  let fixture = ThemeFixture::with_two_updates();
  fs::create_dir_all(fixture.path("updates/next")).unwrap();

  assert_eq!(fixture.theme().versions().unwrap(), ["1.0.0", "1.1.0", "1.2.0"]);
  fixture.theme().build_latest().unwrap();
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn rebuilding_is_byte_identical() {
  let fixture = ThemeFixture::with_two_updates();

  fixture.theme().build_latest().unwrap();
  let first = read_tree(&fixture.latest(""));
  let first_digest = hash_directory(&fixture.latest("")).unwrap();

  fixture.theme().build_latest().unwrap();

  assert_eq!(read_tree(&fixture.latest("")), first);
  assert_eq!(hash_directory(&fixture.latest("")).unwrap(), first_digest);
}

#[test]
fn rebuild_drops_files_from_previous_snapshot() {
  let fixture = ThemeFixture::with_two_updates();
  fixture.theme().build_latest().unwrap();
  fixture.write("latest/manual-edit.txt", "stray");

  fixture.theme().build_latest().unwrap();

  assert!(!fixture.latest("manual-edit.txt").exists());
}

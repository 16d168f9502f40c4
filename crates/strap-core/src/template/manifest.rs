//! Dependency manifest patching
//!
//! Loads a JSON manifest (composer.json, package.json), drops the dependency
//! and script keys owned by disabled features, and rewrites the whole file
//! with four-space indentation. Key order follows the original document.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Section name (e.g. `require-dev`, `scripts`) to the keys to remove from it
pub type ManifestEntries = BTreeMap<String, Vec<String>>;

/// Remove `entries` from the manifest at `path` and write it back.
///
/// Keys or sections absent from the document are ignored. Returns the
/// removed entries as `section.key`.
pub fn patch(path: &Path, entries: &[&ManifestEntries]) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io("read", path, e))?;
    let mut document: Value = serde_json::from_str(&content).map_err(|source| Error::Manifest {
        path: path.to_path_buf(),
        source,
    })?;

    let root = document
        .as_object_mut()
        .ok_or_else(|| Error::ManifestShape { path: path.to_path_buf() })?;

    let mut removed = Vec::new();
    for set in entries {
        for (section, keys) in set.iter() {
            let Some(section_map) = root.get_mut(section).and_then(Value::as_object_mut) else {
                continue;
            };
            for key in keys {
                if section_map.shift_remove(key).is_some() {
                    removed.push(format!("{}.{}", section, key));
                }
            }
        }
    }

    write_pretty(path, &document)?;
    Ok(removed)
}

/// Write with four-space indentation and a trailing newline
fn write_pretty(path: &Path, value: &Value) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| Error::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
    buf.push(b'\n');
    fs::write(path, buf).map_err(|e| Error::io("write", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPOSER: &str = r#"{
  "name": "wp-strap/the-plugin-name",
  "require-dev": {
    "wp-coding-standards/wpcs": "^2.3",
    "lucatume/wp-browser": "^3.0",
    "dealerdirect/phpcodesniffer-composer-installer": "^0.7"
  },
  "scripts": {
    "phpcs": "phpcs",
    "codecept": "codecept"
  },
  "autoload": { "psr-4": { "ThePluginName\\": "classes/" } }
}"#;

    fn phpcs_entries() -> ManifestEntries {
        [
            (
                "require-dev".to_string(),
                vec![
                    "dealerdirect/phpcodesniffer-composer-installer".to_string(),
                    "wp-coding-standards/wpcs".to_string(),
                    "automattic/phpcs-neutron-ruleset".to_string(),
                ],
            ),
            ("scripts".to_string(), vec!["phpcs".to_string()]),
        ]
        .into()
    }

    #[test]
    fn test_disabled_entries_are_removed_and_output_reparses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composer.json");
        fs::write(&path, COMPOSER).unwrap();

        let removed = patch(&path, &[&phpcs_entries()]).unwrap();

        assert_eq!(
            removed,
            vec![
                "require-dev.dealerdirect/phpcodesniffer-composer-installer",
                "require-dev.wp-coding-standards/wpcs",
                "scripts.phpcs",
            ]
        );
        let written = fs::read_to_string(&path).unwrap();
        let doc: Value = serde_json::from_str(&written).unwrap();
        let dev = doc["require-dev"].as_object().unwrap();
        assert!(!dev.contains_key("wp-coding-standards/wpcs"));
        assert!(dev.contains_key("lucatume/wp-browser"));
        assert!(!doc["scripts"].as_object().unwrap().contains_key("phpcs"));
        assert!(written.contains("\n    \"name\""));
        assert!(written.ends_with("}\n"));
    }

    #[test]
    fn test_key_order_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composer.json");
        fs::write(&path, COMPOSER).unwrap();

        patch(&path, &[]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let name = written.find("\"name\"").unwrap();
        let dev = written.find("\"require-dev\"").unwrap();
        let autoload = written.find("\"autoload\"").unwrap();
        assert!(name < dev && dev < autoload);
        assert!(written.find("wpcs").unwrap() < written.find("wp-browser").unwrap());
    }

    #[test]
    fn test_missing_sections_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composer.json");
        fs::write(&path, r#"{"name": "x"}"#).unwrap();

        assert!(patch(&path, &[&phpcs_entries()]).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composer.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(patch(&path, &[]), Err(Error::Manifest { .. })));

        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(patch(&path, &[]), Err(Error::ManifestShape { .. })));
    }
}

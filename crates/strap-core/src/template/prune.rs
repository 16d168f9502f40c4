//! Conditional asset pruning
//!
//! Each optional feature owns a set of files and manifest entries. Files of
//! disabled features are deleted; enabled features keep theirs.

use super::condition::{default_enabled_value, FeatureToggles};
use super::files::is_glob;
use super::manifest::ManifestEntries;
use crate::answers::AnswerSet;
use crate::fsops;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An optional capability of a boilerplate (tests, linting, CI, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Toggle name used by step conditions
    pub name: String,

    /// Answer field deciding the toggle; defaults to `name`
    #[serde(default)]
    pub field: Option<String>,

    /// Value of the field that turns the feature on
    #[serde(default = "default_enabled_value")]
    pub enabled_when: String,

    /// Paths or globs (relative to the project root) deleted when disabled
    #[serde(default)]
    pub files: Vec<String>,

    /// Manifest entries removed when disabled
    #[serde(default)]
    pub manifest: ManifestEntries,
}

impl Feature {
    pub fn field(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.name)
    }

    pub fn is_enabled(&self, answers: &AnswerSet) -> bool {
        answers.get(self.field()) == Some(self.enabled_when.as_str())
    }
}

/// Resolve every feature toggle from the answers
pub fn toggles(features: &[Feature], answers: &AnswerSet) -> FeatureToggles {
    features
        .iter()
        .map(|f| (f.name.clone(), f.is_enabled(answers)))
        .collect()
}

/// Files removed (and failed removals) during a prune
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl PruneReport {
    fn merge(&mut self, other: PruneReport) {
        self.removed.extend(other.removed);
        self.failed.extend(other.failed);
    }
}

/// Delete the file sets of every disabled feature in `features`.
///
/// Best-effort: a path that does not exist is ignored and a deletion that
/// fails is logged and recorded, never returned as an error.
pub fn prune(toggles: &FeatureToggles, features: &[Feature], root: &Path) -> PruneReport {
    let mut report = PruneReport::default();

    for feature in features {
        if toggles.get(&feature.name).copied().unwrap_or(false) {
            continue;
        }
        tracing::debug!(feature = %feature.name, "feature disabled, removing its files");
        report.merge(remove_paths(root, &feature.files));
    }

    report
}

/// Remove literal paths and glob matches under `root`, best-effort
pub fn remove_paths<S: AsRef<str>>(root: &Path, selectors: &[S]) -> PruneReport {
    let mut report = PruneReport::default();

    for selector in selectors {
        let selector = selector.as_ref();
        for path in expand(root, selector) {
            if !fsops::exists(&path) {
                continue;
            }
            match fsops::remove_path(&path) {
                Ok(()) => report.removed.push(path),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not remove");
                    report.failed.push((path, e.to_string()));
                }
            }
        }
    }

    report
}

fn expand(root: &Path, selector: &str) -> Vec<PathBuf> {
    let joined = root.join(selector);
    if !is_glob(selector) {
        return vec![joined];
    }
    match glob::glob(&joined.to_string_lossy()) {
        Ok(paths) => paths.filter_map(|p| p.ok()).collect(),
        Err(e) => {
            tracing::warn!(%selector, error = %e, "invalid removal pattern");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn feature(name: &str, files: &[&str]) -> Feature {
        Feature {
            name: name.to_string(),
            field: None,
            enabled_when: default_enabled_value(),
            files: files.iter().map(|s| s.to_string()).collect(),
            manifest: ManifestEntries::new(),
        }
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_toggles_follow_answers() {
        let mut css = feature("postcss", &[]);
        css.field = Some("css".to_string());
        css.enabled_when = "PostCSS-only".to_string();
        let features = vec![feature("codesniffer", &[]), feature("codeception", &[]), css];
        let answers: AnswerSet = [
            ("codesniffer", "no"),
            ("codeception", "yes"),
            ("css", "PostCSS-only"),
        ]
        .into_iter()
        .collect();

        let toggles = toggles(&features, &answers);

        assert_eq!(toggles.get("codesniffer"), Some(&false));
        assert_eq!(toggles.get("codeception"), Some(&true));
        assert_eq!(toggles.get("postcss"), Some(&true));
    }

    #[test]
    fn test_disabled_feature_files_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "phpcs.xml.dist");
        touch(dir.path(), "tests/wpunit.suite.yml");
        touch(dir.path(), "tests/_data/dump.sql");
        touch(dir.path(), "codeception.dist.yml");
        let features = vec![
            feature("codesniffer", &["phpcs.xml.dist"]),
            feature("codeception", &["codeception.dist.yml", "tests"]),
        ];
        let toggles: FeatureToggles =
            [("codesniffer".to_string(), false), ("codeception".to_string(), true)].into();

        let report = prune(&toggles, &features, dir.path());

        assert_eq!(report.removed, vec![dir.path().join("phpcs.xml.dist")]);
        assert!(!dir.path().join("phpcs.xml.dist").exists());
        assert!(dir.path().join("tests/_data/dump.sql").exists());
        assert!(dir.path().join("codeception.dist.yml").exists());
    }

    #[test]
    fn test_directories_and_globs_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "tests/_data/dump.sql");
        touch(dir.path(), "ci/a.yml");
        touch(dir.path(), "ci/b.yml");
        touch(dir.path(), "ci/keep.txt");

        let report = remove_paths(dir.path(), &["tests", "ci/*.yml"]);

        assert_eq!(report.removed.len(), 3);
        assert!(!dir.path().join("tests").exists());
        assert!(dir.path().join("ci/keep.txt").exists());
    }

    #[test]
    fn test_missing_files_are_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let features = vec![feature("travisCi", &[".travis.yml"])];

        let report = prune(&FeatureToggles::new(), &features, dir.path());

        assert!(report.removed.is_empty());
        assert!(report.failed.is_empty());
    }
}

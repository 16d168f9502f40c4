//! Templating pipeline
//!
//! A recipe's template stage is an ordered list of [`Step`]s: substitution
//! groups, feature pruning, manifest patching, and file moves. Later steps
//! see the tree left by earlier ones, so order is part of the recipe's
//! meaning and steps never run concurrently.

pub mod condition;
pub mod files;
pub mod manifest;
pub mod prune;
pub mod substitute;

use crate::answers::AnswerSet;
use crate::error::Result;
use crate::fsops;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub use condition::{Condition, FeatureToggles, Verdict};
pub use files::{FileSelector, IGNORED_DIRS};
pub use manifest::ManifestEntries;
pub use prune::{prune, toggles, Feature, PruneReport};
pub use substitute::{apply, interpolate, Replacement, RuleOutcome, SubstitutionRule};

/// Search-and-replace rules sharing a file selector and a guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceGroup {
    /// Shown in debug logs
    #[serde(default)]
    pub describe: Option<String>,

    pub files: Vec<String>,

    #[serde(default, skip_serializing_if = "Condition::is_empty")]
    pub when: Condition,

    pub rules: Vec<Replacement>,
}

impl ReplaceGroup {
    pub fn substitution_rules(&self) -> Vec<SubstitutionRule> {
        self.rules
            .iter()
            .map(|replacement| SubstitutionRule {
                files: self.files.clone(),
                replacement: replacement.clone(),
                when: self.when.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneStep {
    /// Features to consider; empty means every feature in the recipe
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestStep {
    /// Manifest path relative to the project root
    pub path: String,

    #[serde(default, skip_serializing_if = "Condition::is_empty")]
    pub when: Condition,
}

/// Relocate or rename a file or directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStep {
    pub from: String,
    pub to: String,

    #[serde(default, skip_serializing_if = "Condition::is_empty")]
    pub when: Condition,

    /// A missing source or failed move is logged instead of aborting
    #[serde(default)]
    pub optional: bool,
}

/// Best-effort removal of leftovers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveStep {
    pub paths: Vec<String>,

    #[serde(default, skip_serializing_if = "Condition::is_empty")]
    pub when: Condition,
}

/// One entry of the template stage. Paths are relative to the project root
/// and may reference answers as `${field}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Replace(ReplaceGroup),
    Prune(PruneStep),
    PatchManifest(ManifestStep),
    Move(MoveStep),
    Remove(RemoveStep),
}

/// Summary of a template run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateReport {
    pub rules_applied: usize,
    pub rules_skipped: usize,
    pub replacements: usize,
    pub files_changed: BTreeSet<PathBuf>,
    pub pruned: Vec<PathBuf>,
    pub manifest_removed: Vec<String>,
    pub moved: Vec<(PathBuf, PathBuf)>,
}

/// Run every step against the project at `root`
pub fn run_steps(
    steps: &[Step],
    features: &[Feature],
    answers: &AnswerSet,
    root: &Path,
) -> Result<TemplateReport> {
    let toggles = toggles(features, answers);
    let mut report = TemplateReport::default();

    for step in steps {
        match step {
            Step::Replace(group) => {
                if let Some(describe) = &group.describe {
                    tracing::debug!(group = %describe, "running replacements");
                }
                let outcomes = apply(&group.substitution_rules(), answers, &toggles, root)?;
                for outcome in outcomes {
                    if outcome.skipped {
                        report.rules_skipped += 1;
                        continue;
                    }
                    report.rules_applied += 1;
                    report.replacements += outcome.replacements();
                    report
                        .files_changed
                        .extend(outcome.changed_files().into_iter().map(Path::to_path_buf));
                }
            }
            Step::Prune(step) => {
                let selected: Vec<Feature> = features
                    .iter()
                    .filter(|f| step.features.is_empty() || step.features.contains(&f.name))
                    .cloned()
                    .collect();
                let pruned = prune(&toggles, &selected, root);
                report.pruned.extend(pruned.removed);
            }
            Step::PatchManifest(step) => {
                if step.when.evaluate(answers, &toggles) != Verdict::Pass {
                    continue;
                }
                let path = root.join(interpolate(&step.path, answers)?);
                let disabled: Vec<&ManifestEntries> = features
                    .iter()
                    .filter(|f| !toggles.get(&f.name).copied().unwrap_or(false))
                    .map(|f| &f.manifest)
                    .collect();
                report
                    .manifest_removed
                    .extend(manifest::patch(&path, &disabled)?);
            }
            Step::Move(step) => {
                if step.when.evaluate(answers, &toggles) != Verdict::Pass {
                    continue;
                }
                let from = root.join(interpolate(&step.from, answers)?);
                let to = root.join(interpolate(&step.to, answers)?);
                if step.optional && !fsops::exists(&from) {
                    tracing::debug!(from = %from.display(), "nothing to move");
                    continue;
                }
                match fsops::move_path(&from, &to) {
                    Ok(()) => report.moved.push((from, to)),
                    Err(e) if step.optional => {
                        tracing::warn!(error = %e, "optional move failed, continuing");
                    }
                    Err(e) => return Err(e),
                }
            }
            Step::Remove(step) => {
                if step.when.evaluate(answers, &toggles) != Verdict::Pass {
                    continue;
                }
                let paths = step
                    .paths
                    .iter()
                    .map(|p| interpolate(p, answers))
                    .collect::<Result<Vec<_>>>()?;
                report.pruned.extend(prune::remove_paths(root, &paths).removed);
            }
        }
    }

    Ok(report)
}

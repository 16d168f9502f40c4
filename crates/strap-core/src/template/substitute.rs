//! Token substitution engine
//!
//! Applies an ordered list of search-and-replace rules to the files of a
//! project. Substitution is purely textual: every occurrence of the pattern
//! is replaced, file syntax is never parsed.

use super::condition::{Condition, FeatureToggles, Verdict};
use super::files::FileSelector;
use crate::answers::AnswerSet;
use crate::error::{Error, Result};
use chrono::Datelike;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A single search-and-replace pair as written in a recipe.
///
/// Exactly one of `find` (literal text) or `regex` must be set. The
/// replacement is interpolated once per application and inserted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    #[serde(rename = "with")]
    pub replacement: String,
}

impl Replacement {
    pub fn literal(find: impl Into<String>, with: impl Into<String>) -> Self {
        Self {
            find: Some(find.into()),
            regex: None,
            replacement: with.into(),
        }
    }

    pub fn regex(pattern: impl Into<String>, with: impl Into<String>) -> Self {
        Self {
            find: None,
            regex: Some(pattern.into()),
            replacement: with.into(),
        }
    }

    /// Compile the pattern; literals are escaped
    pub fn compile(&self) -> Result<Regex> {
        let source = match (&self.find, &self.regex) {
            (Some(find), None) => regex::escape(find),
            (None, Some(regex)) => regex.clone(),
            _ => {
                return Err(Error::Recipe(format!(
                    "replacement `{}` needs exactly one of `find` or `regex`",
                    self.replacement
                )))
            }
        };
        Regex::new(&source).map_err(|source_err| Error::InvalidPattern {
            pattern: source,
            source: source_err,
        })
    }

    /// Human-readable pattern for logs
    pub fn pattern(&self) -> &str {
        self.find
            .as_deref()
            .or(self.regex.as_deref())
            .unwrap_or_default()
    }
}

/// File selector, pattern, replacement and scope guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub files: Vec<String>,
    pub replacement: Replacement,
    pub when: Condition,
}

/// What one rule did to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub path: PathBuf,
    pub replacements: usize,
}

impl FileResult {
    pub fn has_changed(&self) -> bool {
        self.replacements > 0
    }
}

/// What one rule did to the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub pattern: String,
    /// `true` when the scope guard did not hold
    pub skipped: bool,
    /// Every file the selector matched
    pub files: Vec<FileResult>,
}

impl RuleOutcome {
    pub fn changed_files(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|f| f.has_changed())
            .map(|f| f.path.as_path())
            .collect()
    }

    pub fn replacements(&self) -> usize {
        self.files.iter().map(|f| f.replacements).sum()
    }
}

/// Expand `${field}` references from the answer set; `${year}` is the
/// current calendar year unless the answers define a `year` field.
/// An unterminated `${` is kept as literal text.
pub fn interpolate(template: &str, answers: &AnswerSet) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = &after[..end];
        match answers.get(name) {
            Some(value) => out.push_str(value),
            None if name == "year" => out.push_str(&chrono::Local::now().year().to_string()),
            None => return Err(Error::UnknownField(name.to_string())),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Apply `rules` in order to the files under `root`.
///
/// A rule whose guard fails is skipped. The first failing rule (bad pattern,
/// unknown field, unreadable file) aborts the remaining rules.
pub fn apply(
    rules: &[SubstitutionRule],
    answers: &AnswerSet,
    toggles: &FeatureToggles,
    root: &Path,
) -> Result<Vec<RuleOutcome>> {
    let mut outcomes = Vec::with_capacity(rules.len());

    for rule in rules {
        let pattern = rule.replacement.pattern().to_string();

        match rule.when.evaluate(answers, toggles) {
            Verdict::Pass => {}
            Verdict::MissingFields(missing) => {
                tracing::warn!(%pattern, ?missing, "skipping rule, required answers are empty");
                outcomes.push(RuleOutcome { pattern, skipped: true, files: Vec::new() });
                continue;
            }
            Verdict::Unmet => {
                tracing::debug!(%pattern, "skipping rule, condition not met");
                outcomes.push(RuleOutcome { pattern, skipped: true, files: Vec::new() });
                continue;
            }
        }

        let regex = rule.replacement.compile()?;
        let value = interpolate(&rule.replacement.replacement, answers)?;
        let selector = FileSelector::new(&rule.files)?;

        let mut files = Vec::new();
        for path in selector.resolve(root)? {
            let replacements = replace_in_file(&path, &regex, &value)?;
            files.push(FileResult { path, replacements });
        }

        let outcome = RuleOutcome { pattern, skipped: false, files };
        tracing::debug!(
            pattern = %outcome.pattern,
            files = outcome.changed_files().len(),
            replacements = outcome.replacements(),
            "applied rule"
        );
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Replace every match in one file, writing it back only when it changed
fn replace_in_file(path: &Path, regex: &Regex, value: &str) -> Result<usize> {
    let content = fs::read_to_string(path).map_err(|e| Error::io("read", path, e))?;
    let count = regex.find_iter(&content).count();
    if count > 0 {
        let updated = regex.replace_all(&content, NoExpand(value));
        fs::write(path, updated.as_bytes()).map_err(|e| Error::io("write", path, e))?;
    }
    Ok(count)
}

//! Scope guards for template steps

use crate::answers::{AnswerSet, YES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Enabled/disabled state of every feature toggle in a recipe
pub type FeatureToggles = BTreeMap<String, bool>;

/// A feature is enabled when its answer equals this unless the feature says otherwise
pub(crate) fn default_enabled_value() -> String {
    YES.to_string()
}

/// Precondition on the answer set; every clause must hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Fields that must be present and non-empty
    #[serde(default)]
    pub requires: Vec<String>,

    /// Feature toggles that must be on
    #[serde(default)]
    pub enabled: Vec<String>,

    /// Feature toggles that must be off
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Fields that must hold exactly this value
    #[serde(default)]
    pub equals: BTreeMap<String, String>,
}

/// Outcome of evaluating a [`Condition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// One or more required fields are missing or empty
    MissingFields(Vec<String>),
    /// A toggle or value clause does not hold
    Unmet,
}

impl Condition {
    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
            && self.enabled.is_empty()
            && self.disabled.is_empty()
            && self.equals.is_empty()
    }

    pub fn evaluate(&self, answers: &AnswerSet, toggles: &FeatureToggles) -> Verdict {
        let missing: Vec<String> = self
            .requires
            .iter()
            .filter(|f| !answers.is_filled(f))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Verdict::MissingFields(missing);
        }

        let is_on = |name: &String| toggles.get(name).copied().unwrap_or(false);
        let toggles_hold =
            self.enabled.iter().all(is_on) && !self.disabled.iter().any(is_on);
        let values_hold = self
            .equals
            .iter()
            .all(|(field, value)| answers.get(field) == Some(value.as_str()));

        if toggles_hold && values_hold {
            Verdict::Pass
        } else {
            Verdict::Unmet
        }
    }

    /// Feature names referenced by this condition
    pub fn features(&self) -> impl Iterator<Item = &String> {
        self.enabled.iter().chain(self.disabled.iter())
    }
}

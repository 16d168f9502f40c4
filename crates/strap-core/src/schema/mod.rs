//! Question schema
//!
//! Declares every field a boilerplate needs: how it is asked, its default,
//! and whether it is derived from an earlier answer instead of being asked.

pub mod derive;

use crate::answers::Prefill;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use derive::{derive, Transform};

/// How a question is presented and how its answer is normalized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free text, optionally with a default
    #[default]
    Text,
    /// yes/no question; free-text answers are canonicalized
    YesNo,
    /// One of a fixed list of `choices`
    Choice,
}

/// Rule for computing a field from an earlier answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    /// Field the value is computed from
    pub source: String,
    /// Pure string transform applied to the source value
    pub transform: Transform,
}

/// One entry of the answer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    /// Text shown when the field is prompted
    pub prompt: String,

    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub kind: QuestionKind,

    /// Allowed values for `choice` questions
    #[serde(default)]
    pub choices: Vec<String>,

    #[serde(default)]
    pub build_from: Option<Derivation>,

    /// Never asked and never derived
    #[serde(default)]
    pub skip_prompt: bool,

    /// Value supplied up front; overrides prompting and derivation
    #[serde(skip)]
    pub predefined: Option<String>,
}

impl FieldSpec {
    pub fn is_yes_no(&self) -> bool {
        self.kind == QuestionKind::YesNo
    }

    /// Choices offered when prompting
    pub fn options(&self) -> Vec<&str> {
        match self.kind {
            QuestionKind::YesNo => vec![crate::answers::YES, crate::answers::NO],
            QuestionKind::Choice => self.choices.iter().map(String::as_str).collect(),
            QuestionKind::Text => Vec::new(),
        }
    }
}

/// Ordered list of fields; every derivation source precedes its dependents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSchema {
    fields: Vec<FieldSpec>,
}

impl QuestionSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        let schema = Self { fields };
        schema.validate()?;
        Ok(schema)
    }

    /// Check names are unique and derivations only look backwards
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for field in &self.fields {
            if let Some(rule) = &field.build_from {
                if !seen.contains(rule.source.as_str()) {
                    return Err(Error::Recipe(format!(
                        "field `{}` derives from `{}`, which must be declared before it",
                        field.name, rule.source
                    )));
                }
            }
            if field.kind == QuestionKind::Choice && field.choices.is_empty() {
                return Err(Error::Recipe(format!(
                    "choice field `{}` lists no choices",
                    field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::Recipe(format!("field `{}` is declared twice", field.name)));
            }
        }
        Ok(())
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Copy of the schema with command-line values attached as predefined
    /// answers. Unknown names are reported and ignored.
    pub fn with_prefills(&self, prefills: &[Prefill]) -> Self {
        let mut schema = self.clone();
        for prefill in prefills {
            match schema.fields.iter_mut().find(|f| f.name == prefill.name) {
                Some(field) => field.predefined = Some(prefill.value.clone()),
                None => tracing::warn!(name = %prefill.name, "no question with this name, ignoring"),
            }
        }
        schema
    }
}

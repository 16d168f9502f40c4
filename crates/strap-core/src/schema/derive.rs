//! Field derivation
//!
//! Derived fields are computed from exactly one earlier answer through a pure
//! string transform. No I/O, no randomness: the same source always yields the
//! same value.

use super::{FieldSpec, QuestionKind};
use crate::answers::{canonical_yes_no, AnswerSet};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// String transforms available to `build_from`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// `Cool Plugin!` -> `cool-plugin`
    Slugify,
    /// `Cool Plugin` -> `CoolPlugin`
    NamespaceCase,
    /// `Cool Plugin` -> `COOL_PLUGIN`
    ConstantCase,
    LowerCase,
}

impl Transform {
    pub fn apply(self, input: &str) -> String {
        match self {
            Transform::Slugify => slugify(input),
            Transform::NamespaceCase => namespace_case(input),
            Transform::ConstantCase => constant_case(input),
            Transform::LowerCase => input.to_lowercase(),
        }
    }
}

/// Keep ASCII letters, digits, spaces and hyphens; lower-case; each space
/// becomes a hyphen.
pub fn slugify(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-')
        .collect::<String>()
        .to_lowercase()
        .replace(' ', "-")
}

/// Keep ASCII letters, digits, spaces and underscores, split on runs of
/// space/underscore, and return the non-empty words.
fn words(input: &str) -> Vec<String> {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '_')
        .collect::<String>()
        .split([' ', '_'])
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn namespace_case(input: &str) -> String {
    words(&input.to_lowercase())
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn constant_case(input: &str) -> String {
    words(input).join("_").to_uppercase()
}

/// Resolve a field without asking anyone.
///
/// Predefined values win (yes/no fields are canonicalized, choice fields must
/// match a listed choice). Otherwise a derivation is applied to its source
/// answer. `Ok(None)` means the field has to be prompted.
pub fn derive(spec: &FieldSpec, answers: &AnswerSet) -> Result<Option<String>> {
    if let Some(value) = &spec.predefined {
        match spec.kind {
            QuestionKind::YesNo => return Ok(Some(canonical_yes_no(value).to_string())),
            QuestionKind::Choice => {
                if let Some(choice) = spec.choices.iter().find(|c| c.eq_ignore_ascii_case(value)) {
                    return Ok(Some(choice.clone()));
                }
                tracing::warn!(
                    field = %spec.name,
                    value = %value,
                    "predefined value is not one of the choices, asking instead"
                );
            }
            QuestionKind::Text => return Ok(Some(value.clone())),
        }
    }

    if let Some(rule) = &spec.build_from {
        let source = answers
            .get(&rule.source)
            .ok_or_else(|| Error::UnresolvedSource {
                field: spec.name.clone(),
                source_field: rule.source.clone(),
            })?;
        return Ok(Some(rule.transform.apply(source)));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Derivation;

    fn spec(name: &str) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            prompt: String::new(),
            default: None,
            kind: QuestionKind::Text,
            choices: Vec::new(),
            build_from: None,
            skip_prompt: false,
            predefined: None,
        }
    }

    #[test]
    fn test_transforms_on_project_name() {
        for _ in 0..2 {
            assert_eq!(Transform::Slugify.apply("Cool Plugin"), "cool-plugin");
            assert_eq!(Transform::NamespaceCase.apply("Cool Plugin"), "CoolPlugin");
            assert_eq!(Transform::ConstantCase.apply("Cool Plugin"), "COOL_PLUGIN");
            assert_eq!(Transform::LowerCase.apply("COOL_PLUGIN"), "cool_plugin");
        }
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("The Dev Company, Inc."), "the-dev-company-inc");
        assert_eq!(slugify("WordPress Replacer-Plugin"), "wordpress-replacer-plugin");
    }

    #[test]
    fn test_case_transforms_split_on_underscores() {
        assert_eq!(namespace_case("my_cool  plugin"), "MyCoolPlugin");
        assert_eq!(namespace_case("WORDPRESS Replacer"), "WordpressReplacer");
        assert_eq!(constant_case("my_cool  plugin!"), "MY_COOL_PLUGIN");
    }

    #[test]
    fn test_derive_uses_source_answer() {
        let mut field = spec("package");
        field.build_from = Some(Derivation {
            source: "projectName".to_string(),
            transform: Transform::Slugify,
        });
        let answers: AnswerSet = [("projectName", "Cool Plugin")].into_iter().collect();

        assert_eq!(derive(&field, &answers).unwrap().as_deref(), Some("cool-plugin"));
    }

    #[test]
    fn test_derive_fails_on_unresolved_source() {
        let mut field = spec("package");
        field.build_from = Some(Derivation {
            source: "projectName".to_string(),
            transform: Transform::Slugify,
        });

        let err = derive(&field, &AnswerSet::new()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedSource { .. }));
    }

    #[test]
    fn test_predefined_skips_derivation() {
        let mut field = spec("package");
        field.build_from = Some(Derivation {
            source: "projectName".to_string(),
            transform: Transform::Slugify,
        });
        field.predefined = Some("custom-slug".to_string());

        assert_eq!(
            derive(&field, &AnswerSet::new()).unwrap().as_deref(),
            Some("custom-slug")
        );
    }

    #[test]
    fn test_predefined_yes_no_is_canonicalized() {
        let mut field = spec("webpack");
        field.kind = QuestionKind::YesNo;

        field.predefined = Some("Y".to_string());
        assert_eq!(derive(&field, &AnswerSet::new()).unwrap().as_deref(), Some("yes"));

        field.predefined = Some("nah".to_string());
        assert_eq!(derive(&field, &AnswerSet::new()).unwrap().as_deref(), Some("no"));
    }

    #[test]
    fn test_predefined_choice_must_match() {
        let mut field = spec("css");
        field.kind = QuestionKind::Choice;
        field.choices = vec!["Sass+PostCSS".to_string(), "PostCSS-only".to_string()];

        field.predefined = Some("postcss-only".to_string());
        assert_eq!(
            derive(&field, &AnswerSet::new()).unwrap().as_deref(),
            Some("PostCSS-only")
        );

        field.predefined = Some("Less".to_string());
        assert_eq!(derive(&field, &AnswerSet::new()).unwrap(), None);
    }

    #[test]
    fn test_plain_question_needs_prompt() {
        assert_eq!(derive(&spec("author"), &AnswerSet::new()).unwrap(), None);
    }
}

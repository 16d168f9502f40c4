//! Collected project metadata
//!
//! An [`AnswerSet`] is filled in three passes (predefined, prompted, derived)
//! and then handed, read-only, to the templating stage.

use std::fmt;

/// Canonical value for an affirmative yes/no answer
pub const YES: &str = "yes";

/// Canonical value for a negative yes/no answer
pub const NO: &str = "no";

/// Free-text tokens that count as "yes" (compared case-insensitively)
const TRUTHY: &[&str] = &["y", "yes", "1", "true", "confirm", "i do", "i am"];

/// Normalize a free-text yes/no answer to [`YES`] or [`NO`]
pub fn canonical_yes_no(input: &str) -> &'static str {
    let lowered = input.to_lowercase();
    if TRUTHY.contains(&lowered.as_str()) {
        YES
    } else {
        NO
    }
}

/// Ordered mapping from field name to answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    entries: Vec<(String, String)>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, keeping its original position when it already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// True when the field exists and holds a non-empty value
    pub fn is_filled(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    /// True when the field holds the canonical "yes"
    pub fn is_yes(&self, name: &str) -> bool {
        self.get(name) == Some(YES)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut answers = AnswerSet::new();
        for (name, value) in iter {
            answers.insert(name, value);
        }
        answers
    }
}

impl fmt::Display for AnswerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "- {}: {}", name, value)?;
        }
        Ok(())
    }
}

/// A `name:value` token supplied on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefill {
    pub name: String,
    pub value: String,
}

impl Prefill {
    /// Parse a `name:value` token; only the first colon separates, so values
    /// such as URLs keep theirs. Tokens without a colon or value are ignored.
    pub fn parse(token: &str) -> Option<Self> {
        let (name, value) = token.split_once(':')?;
        let name = name.trim();
        if name.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Parse every token, dropping the ones that are not `name:value`
    pub fn parse_all<S: AsRef<str>>(tokens: &[S]) -> Vec<Self> {
        tokens
            .iter()
            .filter_map(|t| {
                let parsed = Self::parse(t.as_ref());
                if parsed.is_none() {
                    tracing::warn!(token = t.as_ref(), "ignoring argument, expected name:value");
                }
                parsed
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_tokens_canonicalize_to_yes() {
        for input in ["Y", "yes", "1", "true", "confirm", "TRUE", "I do", "i am"] {
            assert_eq!(canonical_yes_no(input), YES, "input {:?}", input);
        }
    }

    #[test]
    fn test_everything_else_canonicalizes_to_no() {
        for input in ["", "n", "no", "0", "false", "nope", " yes", "yess"] {
            assert_eq!(canonical_yes_no(input), NO, "input {:?}", input);
        }
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut answers = AnswerSet::new();
        answers.insert("projectName", "Cool Plugin");
        answers.insert("package", "cool-plugin");
        answers.insert("projectName", "Hot Plugin");

        let names: Vec<_> = answers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["projectName", "package"]);
        assert_eq!(answers.get("projectName"), Some("Hot Plugin"));
    }

    #[test]
    fn test_is_filled_and_is_yes() {
        let answers: AnswerSet = [("a", ""), ("b", "x"), ("c", "yes")].into_iter().collect();
        assert!(!answers.is_filled("a"));
        assert!(answers.is_filled("b"));
        assert!(!answers.is_filled("missing"));
        assert!(answers.is_yes("c"));
        assert!(!answers.is_yes("b"));
    }

    #[test]
    fn test_prefill_splits_on_first_colon() {
        let p = Prefill::parse("url:https://dev-company.com").unwrap();
        assert_eq!(p.name, "url");
        assert_eq!(p.value, "https://dev-company.com");

        let p = Prefill::parse("projectName:Cool Plugin").unwrap();
        assert_eq!(p.value, "Cool Plugin");
    }

    #[test]
    fn test_prefill_rejects_malformed_tokens() {
        assert!(Prefill::parse("nocolon").is_none());
        assert!(Prefill::parse("name:").is_none());
        assert!(Prefill::parse(":value").is_none());

        let parsed = Prefill::parse_all(&["license:MIT", "garbage", "webpack:Y"]);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_display_lists_answers_in_order() {
        let answers: AnswerSet = [("projectName", "Cool Plugin"), ("license", "MIT")]
            .into_iter()
            .collect();
        assert_eq!(
            answers.to_string(),
            "- projectName: Cool Plugin\n- license: MIT\n"
        );
    }
}

//! Answer collection
//!
//! Walks the question schema in order: predefined and derived fields resolve
//! on their own, everything else goes to a [`Prompter`]. The whole pass
//! repeats until the user accepts the summary.

use crate::answers::{canonical_yes_no, AnswerSet};
use crate::error::Error;
use crate::schema::{derive, FieldSpec, QuestionKind, QuestionSchema};
use anyhow::Result;

/// Typing this at any prompt leaves the tool
pub const EXIT_SENTINEL: &str = "exit";

/// Front-end that can ask the user for a value
pub trait Prompter {
    /// Ask a single question and return the raw answer
    fn ask(&mut self, field: &FieldSpec) -> Result<String>;

    /// Show the collected answers and ask whether they look right
    fn confirm_summary(&mut self, answers: &AnswerSet) -> Result<bool>;

    /// Called for every field resolved without prompting
    fn resolved(&mut self, _field: &FieldSpec, _value: &str) -> Result<()> {
        Ok(())
    }
}

/// Fill an [`AnswerSet`] for `schema`.
///
/// With `skip_summary` the first pass is accepted as is.
pub fn collect_answers<P: Prompter>(
    schema: &QuestionSchema,
    prompter: &mut P,
    skip_summary: bool,
) -> Result<AnswerSet> {
    loop {
        let mut answers = AnswerSet::new();

        for field in schema.fields() {
            if field.skip_prompt {
                continue;
            }

            if let Some(value) = derive(field, &answers)? {
                prompter.resolved(field, &value)?;
                answers.insert(field.name.clone(), value);
                continue;
            }

            let raw = prompter.ask(field)?;
            answers.insert(field.name.clone(), normalize(field, raw)?);
        }

        if skip_summary || prompter.confirm_summary(&answers)? {
            return Ok(answers);
        }
    }
}

fn normalize(field: &FieldSpec, raw: String) -> Result<String> {
    if raw.trim() == EXIT_SENTINEL {
        return Err(Error::Cancelled.into());
    }

    let value = match (&field.default, raw.is_empty()) {
        (Some(default), true) => default.clone(),
        _ => raw,
    };

    Ok(match field.kind {
        QuestionKind::YesNo => canonical_yes_no(&value).to_string(),
        QuestionKind::Text | QuestionKind::Choice => value,
    })
}

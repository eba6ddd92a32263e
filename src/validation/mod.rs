//! Response validation.
//!
//! Turns untrusted generative-backend output into a [`QuizDraft`] or a
//! specific error. Validation is pure: no I/O, no logging side effects that
//! change the result, and the same input always yields the same outcome.
//!
//! Two failure classes are distinguished:
//!
//! - [`QuizlyError::MalformedResponse`]: no parseable JSON object could be
//!   found in the text at all.
//! - [`QuizlyError::SchemaViolation`]: JSON was found but it is not a quiz of
//!   the required shape (wrong question count, wrong option count, duplicate
//!   options, answer missing from the options, and so on).

mod extract;
mod schema;

use crate::error::{QuizlyError, Result};
use crate::quiz::QuizDraft;

/// Validate a raw model response against the quiz schema.
///
/// `expected_questions` is the exact number of questions the quiz must have.
pub fn validate(raw: &str, expected_questions: usize) -> Result<QuizDraft> {
    let value = extract::extract_json(raw)?;
    schema::decode_quiz(&value, expected_questions).map_err(QuizlyError::from)
}

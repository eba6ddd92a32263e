//! Structural decode of a parsed model response into a [`QuizDraft`].

use crate::error::{Location, SchemaViolation};
use crate::quiz::{QuestionDraft, QuizDraft, OPTIONS_PER_QUESTION};
use serde_json::{Map, Value};

type Decoded<T> = std::result::Result<T, SchemaViolation>;

/// Decode `value` into a quiz with exactly `expected_questions` questions.
///
/// Checks run in document order and stop at the first violation; nothing is
/// returned unless every question passes.
pub(crate) fn decode_quiz(value: &Value, expected_questions: usize) -> Decoded<QuizDraft> {
    let quiz = value.as_object().ok_or(SchemaViolation::NotAnObject {
        found: type_name(value),
    })?;

    let title = required_str(quiz, Location::Quiz, "title")?;
    if title.is_empty() {
        return Err(SchemaViolation::EmptyTitle);
    }

    let description = match quiz.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => {
            return Err(SchemaViolation::WrongType {
                at: Location::Quiz,
                field: "description",
                expected: "a string",
                found: type_name(other),
            })
        }
    };

    let questions = match required(quiz, Location::Quiz, "questions")? {
        Value::Array(items) => items,
        other => {
            return Err(SchemaViolation::WrongType {
                at: Location::Quiz,
                field: "questions",
                expected: "an array",
                found: type_name(other),
            })
        }
    };

    if questions.len() != expected_questions {
        return Err(SchemaViolation::QuestionCount {
            expected: expected_questions,
            actual: questions.len(),
        });
    }

    let questions = questions
        .iter()
        .enumerate()
        .map(|(i, q)| decode_question(q, i + 1))
        .collect::<Decoded<Vec<_>>>()?;

    Ok(QuizDraft::new(title.to_string(), description, questions))
}

fn decode_question(value: &Value, number: usize) -> Decoded<QuestionDraft> {
    let at = Location::Question(number);
    let question = value.as_object().ok_or(SchemaViolation::WrongType {
        at,
        field: "questions",
        expected: "an object",
        found: type_name(value),
    })?;

    let text = required_str(question, at, "question_title")?;
    if text.is_empty() {
        return Err(SchemaViolation::EmptyQuestion { question: number });
    }

    let raw_options = match required(question, at, "question_options")? {
        Value::Array(items) => items,
        other => {
            return Err(SchemaViolation::WrongType {
                at,
                field: "question_options",
                expected: "an array",
                found: type_name(other),
            })
        }
    };

    if raw_options.len() != OPTIONS_PER_QUESTION {
        return Err(SchemaViolation::OptionCount {
            question: number,
            actual: raw_options.len(),
        });
    }

    let mut options: [String; OPTIONS_PER_QUESTION] = Default::default();
    for (slot, (i, raw)) in options.iter_mut().zip(raw_options.iter().enumerate()) {
        let option = raw.as_str().ok_or(SchemaViolation::WrongType {
            at,
            field: "question_options",
            expected: "an array of strings",
            found: type_name(raw),
        })?;
        let option = option.trim();
        if option.is_empty() {
            return Err(SchemaViolation::EmptyOption {
                question: number,
                option: i + 1,
            });
        }
        *slot = option.to_string();
    }

    for (i, option) in options.iter().enumerate() {
        if options[..i].contains(option) {
            return Err(SchemaViolation::DuplicateOption {
                question: number,
                option: option.clone(),
            });
        }
    }

    let answer = required_str(question, at, "answer")?;
    if !options.iter().any(|o| o == answer) {
        return Err(SchemaViolation::AnswerNotInOptions {
            question: number,
            answer: answer.to_string(),
        });
    }

    Ok(QuestionDraft::new(
        text.to_string(),
        options,
        answer.to_string(),
    ))
}

fn required<'a>(
    object: &'a Map<String, Value>,
    at: Location,
    field: &'static str,
) -> Decoded<&'a Value> {
    match object.get(field) {
        None | Some(Value::Null) => Err(SchemaViolation::MissingField { at, field }),
        Some(value) => Ok(value),
    }
}

/// A required string field, trimmed.
fn required_str<'a>(
    object: &'a Map<String, Value>,
    at: Location,
    field: &'static str,
) -> Decoded<&'a str> {
    let value = required(object, at, field)?;
    value
        .as_str()
        .map(str::trim)
        .ok_or(SchemaViolation::WrongType {
            at,
            field,
            expected: "a string",
            found: type_name(value),
        })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Locating the JSON payload inside free-form model output.

use crate::error::{QuizlyError, Result};
use serde_json::{Deserializer, Value};

/// Find the first well-formed top-level JSON object in `raw`.
///
/// Every `{` or `[` is a candidate start. A candidate that fails to parse
/// hands over to the next bracket after the point where parsing broke, so a
/// stray bracket in the prose does not hide the payload behind it, while the
/// question objects inside a truncated quiz never stand in for the quiz
/// itself. Elements of a parsed array are skipped. When no object parses,
/// the first well-formed array is returned instead.
pub(crate) fn extract_json(raw: &str) -> Result<Value> {
    let mut first_array = None;
    let mut first_error = None;
    let mut pos = 0;

    while let Some(start) = next_candidate(raw, pos) {
        let text = &raw[start..];
        let mut values = Deserializer::from_str(text).into_iter::<Value>();

        match values.next() {
            Some(Ok(value @ Value::Object(_))) => return Ok(value),
            Some(Ok(value)) => {
                pos = start + values.byte_offset().max(1);
                if first_array.is_none() {
                    first_array = Some(value);
                }
            }
            Some(Err(e)) => {
                pos = start + error_offset(text, &e).max(1);
                if first_error.is_none() {
                    first_error = Some(e.to_string());
                }
            }
            None => break,
        }
    }

    if let Some(array) = first_array {
        return Ok(array);
    }

    let reason = match first_error {
        Some(e) => format!("no well-formed JSON object found ({})", e),
        None => "no JSON object found in response".to_string(),
    };
    Err(QuizlyError::MalformedResponse(format!(
        "{}; response began with: {:?}",
        reason,
        preview(raw, 120)
    )))
}

/// Byte index of the next `{` or `[` at or after `from`.
fn next_candidate(raw: &str, from: usize) -> Option<usize> {
    raw.as_bytes()
        .get(from..)?
        .iter()
        .position(|&b| b == b'{' || b == b'[')
        .map(|i| from + i)
}

/// Byte offset into `text` where `err` was raised.
///
/// serde_json reports 1-based lines and byte columns.
fn error_offset(text: &str, err: &serde_json::Error) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(err.line().saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + err.column().saturating_sub(1)).min(text.len())
}

fn preview(raw: &str, max_chars: usize) -> String {
    raw.trim().chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_plain_object() {
        let value = extract_json(r#"{"title": "T"}"#).unwrap();
        assert_eq!(value["title"], "T");
    }

    #[test]
    fn test_object_inside_code_fence() {
        let raw = "```json\n{\"title\": \"T\", \"questions\": []}\n```";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["title"], "T");
    }

    #[test]
    fn test_skips_prose_braces_and_citations() {
        let raw = r#"Sure! See [1]. Here is {your quiz}:
{"title": "Real", "questions": []}
Let me know if you want changes."#;
        let value = extract_json(raw).unwrap();
        assert_eq!(value["title"], "Real");
    }

    #[test]
    fn test_brackets_inside_strings() {
        let raw = r#"{"title": "Sets {a, b} and lists [1, 2]", "questions": []}"#;
        let value = extract_json(raw).unwrap();
        assert_eq!(value["title"], "Sets {a, b} and lists [1, 2]");
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let raw = r#"{"title": "He said \"}\" loudly", "questions": []}"#;
        let value = extract_json(raw).unwrap();
        assert_eq!(value["title"], "He said \"}\" loudly");
    }

    #[test]
    fn test_truncated_object_is_malformed() {
        let raw = r#"{"title": "T", "questions": [{"question_title": "Q", "question_options": ["a","b","c","d"], "answer": "a"}, {"question_title": "#;
        let err = extract_json(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_trailing_comma_is_malformed() {
        let err = extract_json(r#"{"title": "T", "questions": [],}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_no_json_at_all() {
        let err = extract_json("I'm sorry, I can't help with that.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);

        let err = extract_json("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_array_fallback() {
        let value = extract_json("result: [1, 2, 3]").unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_stray_bracket_in_prose() {
        let raw = "Here is your quiz (see [notes below:\n{\"title\": \"Real\", \"questions\": []}";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["title"], "Real");

        let raw = "Happy to help :-[ \n```json\n{\"title\": \"Real\", \"questions\": []}\n```";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["title"], "Real");

        let raw = "Options {a, b\n{\"title\": \"Real\", \"questions\": []}";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["title"], "Real");
    }

    #[test]
    fn test_objects_before_a_syntax_error_are_not_used() {
        let raw = r#"{"title": "T", "questions": [{"question_title": "Q"}] oops}"#;
        let err = extract_json(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_array_elements_are_not_objects() {
        let value = extract_json(r#"[{"title": "Q"}]"#).unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_object_after_array_wins() {
        let value = extract_json(r#"Sources: [1, 2]. {"title": "T"}"#).unwrap();
        assert_eq!(value["title"], "T");
    }

    #[test]
    fn test_error_offset() {
        let text = "[\n  nope]";
        let err = serde_json::from_str::<Value>(text).unwrap_err();
        let offset = error_offset(text, &err);
        assert!((4..8).contains(&offset), "offset {} outside \"nope\"", offset);
    }
}

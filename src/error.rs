//! Error types for Quizly.

use std::fmt;
use thiserror::Error;

/// Library-level error type for Quizly operations.
///
/// Every pipeline stage fails with its own variant, and the variant reaches
/// the caller unchanged. Use [`QuizlyError::kind`] to branch on the failure
/// class and [`QuizlyError::is_retryable`] to decide whether running the same
/// request again could succeed.
#[derive(Error, Debug)]
pub enum QuizlyError {
    #[error("Invalid video source: {0}")]
    InvalidSource(String),

    #[error("Audio acquisition failed: {0}")]
    Acquisition(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Quiz synthesis failed ({cause}): {message}")]
    Synthesis {
        cause: BackendFailure,
        message: String,
    },

    #[error("Transcript too large: {actual} characters exceeds the limit of {limit}")]
    InputTooLarge { actual: usize, limit: usize },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Quiz schema violation: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl QuizlyError {
    pub(crate) fn synthesis(cause: BackendFailure, message: impl Into<String>) -> Self {
        Self::Synthesis {
            cause,
            message: message.into(),
        }
    }

    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizlyError::InvalidSource(_) => ErrorKind::InvalidSource,
            QuizlyError::Acquisition(_) => ErrorKind::Acquisition,
            QuizlyError::Transcription(_) => ErrorKind::Transcription,
            QuizlyError::Synthesis { .. } => ErrorKind::Synthesis,
            QuizlyError::InputTooLarge { .. } => ErrorKind::InputTooLarge,
            QuizlyError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            QuizlyError::SchemaViolation(_) => ErrorKind::SchemaViolation,
            QuizlyError::Config(_) | QuizlyError::ToolNotFound(_) | QuizlyError::TomlParse(_) => {
                ErrorKind::Config
            }
            QuizlyError::Io(_) | QuizlyError::Json(_) => ErrorKind::Io,
        }
    }

    /// Whether repeating the request unchanged has a reasonable chance of succeeding.
    ///
    /// Network and backend hiccups are retryable, and so is a one-off garbled
    /// completion. Bad input, schema violations and misconfiguration are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            QuizlyError::Acquisition(_)
            | QuizlyError::Transcription(_)
            | QuizlyError::MalformedResponse(_) => true,
            QuizlyError::Synthesis { cause, .. } => cause.is_retryable(),
            _ => false,
        }
    }
}

/// Stable tag for each failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSource,
    Acquisition,
    Transcription,
    Synthesis,
    InputTooLarge,
    MalformedResponse,
    SchemaViolation,
    Config,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidSource => "invalid_source",
            ErrorKind::Acquisition => "acquisition",
            ErrorKind::Transcription => "transcription",
            ErrorKind::Synthesis => "synthesis",
            ErrorKind::InputTooLarge => "input_too_large",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::SchemaViolation => "schema_violation",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

/// Why the generative backend did not produce a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFailure {
    /// Transport error, 5xx, rate limiting or an unreadable reply.
    Unavailable,
    /// Missing or rejected credentials.
    Auth,
    /// Account quota exhausted.
    Quota,
    /// The configured synthesis timeout elapsed.
    Timeout,
    /// The backend answered with nothing but whitespace.
    EmptyCompletion,
    /// The request itself was rejected as invalid.
    Request,
}

impl BackendFailure {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            BackendFailure::Unavailable | BackendFailure::Timeout | BackendFailure::EmptyCompletion
        )
    }
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendFailure::Unavailable => "backend unavailable",
            BackendFailure::Auth => "authentication",
            BackendFailure::Quota => "quota exceeded",
            BackendFailure::Timeout => "timeout",
            BackendFailure::EmptyCompletion => "empty completion",
            BackendFailure::Request => "invalid request",
        };
        f.write_str(name)
    }
}

/// Where in the quiz document a schema problem was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Quiz,
    /// 1-based question number.
    Question(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Quiz => f.write_str("quiz"),
            Location::Question(n) => write!(f, "question {}", n),
        }
    }
}

/// A parsed model response that does not have the quiz shape.
///
/// Question numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("top-level JSON value is {found}, expected an object")]
    NotAnObject { found: &'static str },

    #[error("{at}: missing required field `{field}`")]
    MissingField { at: Location, field: &'static str },

    #[error("{at}: field `{field}` must be {expected}, found {found}")]
    WrongType {
        at: Location,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("quiz title is empty")]
    EmptyTitle,

    #[error("expected exactly {expected} questions, found {actual}")]
    QuestionCount { expected: usize, actual: usize },

    #[error("question {question}: question text is empty")]
    EmptyQuestion { question: usize },

    #[error("question {question}: expected exactly 4 options, found {actual}")]
    OptionCount { question: usize, actual: usize },

    #[error("question {question}: option {option} is empty")]
    EmptyOption { question: usize, option: usize },

    #[error("question {question}: duplicate option {option:?}")]
    DuplicateOption { question: usize, option: String },

    #[error("question {question}: answer {answer:?} is not one of the options")]
    AnswerNotInOptions { question: usize, answer: String },
}

/// Result type alias for Quizly operations.
pub type Result<T> = std::result::Result<T, QuizlyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            QuizlyError::InvalidSource("x".into()).kind(),
            ErrorKind::InvalidSource
        );
        assert_eq!(
            QuizlyError::from(SchemaViolation::EmptyTitle).kind(),
            ErrorKind::SchemaViolation
        );
        assert_eq!(
            QuizlyError::ToolNotFound("yt-dlp".into()).kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn test_retryable_classes() {
        assert!(QuizlyError::Acquisition("reset".into()).is_retryable());
        assert!(QuizlyError::MalformedResponse("garbage".into()).is_retryable());
        assert!(QuizlyError::synthesis(BackendFailure::Timeout, "slow").is_retryable());

        assert!(!QuizlyError::synthesis(BackendFailure::Auth, "bad key").is_retryable());
        assert!(!QuizlyError::InvalidSource("nope".into()).is_retryable());
        assert!(!QuizlyError::InputTooLarge { actual: 10, limit: 5 }.is_retryable());
        assert!(!QuizlyError::from(SchemaViolation::QuestionCount {
            expected: 10,
            actual: 9
        })
        .is_retryable());
    }

    #[test]
    fn test_schema_violation_messages() {
        let err = SchemaViolation::MissingField {
            at: Location::Question(3),
            field: "answer",
        };
        assert_eq!(err.to_string(), "question 3: missing required field `answer`");

        let err = SchemaViolation::DuplicateOption {
            question: 2,
            option: "A".into(),
        };
        assert_eq!(err.to_string(), "question 2: duplicate option \"A\"");
    }
}

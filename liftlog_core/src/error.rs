//! Error types for the liftlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// A single field-level validation problem, addressed by its path
/// (e.g. `routines[2].days[0].weekday`).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Core error type for liftlog_core operations
///
/// Every variant is a recoverable condition; the caller translates these
/// into user feedback rather than aborting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected input with field-level detail; caller should re-prompt
    #[error("validation failed: {}", format_issues(.0))]
    Validation(Vec<FieldIssue>),

    /// Referenced entity or entry is absent; caller should refresh state
    #[error("not found: {0}")]
    NotFound(String),

    /// Numeric precondition violated in the metrics engine
    #[error("input out of range: {0}")]
    OutOfRangeInput(String),

    /// Storage capability absent on this provider
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// Completion requested while entries remain pending (strict policy only)
    #[error("session incomplete: {remaining} entries still pending")]
    IncompleteSession { remaining: usize },

    /// Storage provider backend failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Build a validation error from a single field issue
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(vec![FieldIssue::new(path, message)])
    }

    /// The field issues carried by a `Validation` error, if any
    pub fn field_issues(&self) -> Option<&[FieldIssue]> {
        match self {
            Error::Validation(issues) => Some(issues),
            _ => None,
        }
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = Error::Validation(vec![
            FieldIssue::new("name", "must not be empty"),
            FieldIssue::new("days[0].weekday", "must be 0-6"),
        ]);

        let rendered = err.to_string();
        assert!(rendered.contains("name: must not be empty"));
        assert!(rendered.contains("days[0].weekday: must be 0-6"));
    }

    #[test]
    fn test_field_issues_accessor() {
        let err = Error::validation("pace", "must be derived");
        assert_eq!(err.field_issues().unwrap().len(), 1);

        let other = Error::NotFound("exercise 'squat'".into());
        assert!(other.field_issues().is_none());
    }
}

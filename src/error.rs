//! Processing pipeline error taxonomy
//!
//! Every failure a `/process-text/` request can hit collapses into
//! [`ProcessError`]. Display strings double as the user-visible error
//! messages, so their wording is part of the API surface.

use thiserror::Error;

use crate::ai::LlmError;
use crate::substitution::SubstitutionError;

/// Errors surfaced by the request-processing pipeline
#[derive(Error, Debug)]
pub enum ProcessError {
    /// No LLM credential was configured at startup
    #[error("Google API key not configured.")]
    LlmUnavailable,

    /// A generation call failed (transport, provider, or blocked prompt)
    #[error("Failed to get regex from LLM: {0}")]
    LlmGeneration(#[source] LlmError),

    /// Both generations succeeded but the cleaned pattern was empty
    #[error("LLM did not return a regex pattern.")]
    EmptyPattern,

    /// The generated pattern does not compile
    #[error("Invalid regex pattern generated by LLM: '{pattern}'. Details: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Anything the taxonomy does not name
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

pub type ProcessResult<T> = Result<T, ProcessError>;

impl From<LlmError> for ProcessError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => ProcessError::LlmUnavailable,
            other => ProcessError::LlmGeneration(other),
        }
    }
}

impl From<SubstitutionError> for ProcessError {
    fn from(err: SubstitutionError) -> Self {
        match err {
            SubstitutionError::InvalidPattern { pattern, source } => {
                ProcessError::InvalidPattern { pattern, source }
            }
            SubstitutionError::Serialize(e) => ProcessError::Unexpected(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_is_not_wrapped() {
        let err = ProcessError::from(LlmError::NotConfigured);
        assert!(matches!(err, ProcessError::LlmUnavailable));
        assert_eq!(err.to_string(), "Google API key not configured.");
    }

    #[test]
    fn test_generation_failures_are_wrapped() {
        let err = ProcessError::from(LlmError::Blocked {
            reason: "SAFETY".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to get regex from LLM: LLM response was blocked or empty. Reason: SAFETY"
        );
    }

    #[test]
    fn test_invalid_pattern_carries_pattern() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ProcessError::InvalidPattern {
            pattern: "(".to_string(),
            source,
        };
        assert!(err
            .to_string()
            .starts_with("Invalid regex pattern generated by LLM: '('. Details: "));
    }

    #[test]
    fn test_serialize_failure_maps_to_unexpected() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ProcessError::from(SubstitutionError::Serialize(json_err));
        assert!(matches!(err, ProcessError::Unexpected(_)));
        assert!(err
            .to_string()
            .starts_with("An unexpected error occurred: "));
    }
}

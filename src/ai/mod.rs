//! LLM client abstraction
//!
//! Unified interface for the text-completion provider, plus the cleanup
//! pass applied to raw completions. The pattern call and the replacement
//! call go through the same trait and the same cleanup so the two always
//! behave identically.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiClient, GeminiConfig};

/// Errors from the LLM provider layer
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Google API key not configured.")]
    NotConfigured,

    #[error("LLM response was blocked or empty. Reason: {reason}")]
    Blocked { reason: String },

    #[error("request to Gemini failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse Gemini response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid Gemini response: {0}")]
    InvalidResponse(String),
}

pub type LlmResult<T> = Result<T, LlmError>;

/// Text-completion client used by the request pipeline
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one prompt, return the raw completion text.
    ///
    /// Callers are expected to run the result through [`clean_response`];
    /// the provider does not strip fences or labels itself.
    async fn generate(&self, prompt: &str) -> LlmResult<String>;

    /// Model identifier for logging
    fn model_name(&self) -> &str;
}

/// Strip the wrapping the model tends to add around a bare regex.
///
/// Applied once to every completion, in this order: trim, remove a
/// surrounding triple-backtick fence, remove a leading `regex pattern:`
/// label, remove a leading `regex:` label. The label checks cascade, so
/// `Regex pattern: regex: \d+` reduces all the way to `\d+`. Labels are
/// matched case-insensitively and stripped up to and including the first
/// colon.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();

    if text.starts_with("```") && text.ends_with("```") {
        text = if text.len() >= 6 {
            text[3..text.len() - 3].trim()
        } else {
            // Degenerate fence like "```" on its own
            ""
        };
    }

    for label in ["regex pattern:", "regex:"] {
        if has_ci_prefix(text, label) {
            // The first colon is the label's own colon
            if let Some(idx) = text.find(':') {
                text = text[idx + 1..].trim();
            }
        }
    }

    text.to_string()
}

fn has_ci_prefix(text: &str, label: &str) -> bool {
    text.get(..label.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_plain_text() {
        assert_eq!(clean_response("\\d+"), "\\d+");
        assert_eq!(clean_response("  \\d+  \n"), "\\d+");
    }

    #[test]
    fn test_clean_strips_fence() {
        assert_eq!(clean_response("```abc```"), "abc");
        assert_eq!(clean_response("```\n\\d{3}\n```"), "\\d{3}");
    }

    #[test]
    fn test_clean_fence_requires_both_ends() {
        assert_eq!(clean_response("```abc"), "```abc");
        assert_eq!(clean_response("abc```"), "abc```");
    }

    #[test]
    fn test_clean_degenerate_fences() {
        assert_eq!(clean_response("```"), "");
        assert_eq!(clean_response("``````"), "");
    }

    #[test]
    fn test_clean_strips_regex_label() {
        assert_eq!(clean_response("Regex: abc"), "abc");
        assert_eq!(clean_response("REGEX: abc"), "abc");
        assert_eq!(clean_response("regex pattern: abc"), "abc");
        assert_eq!(clean_response("Regex Pattern: abc"), "abc");
    }

    #[test]
    fn test_clean_keeps_interior_colons() {
        assert_eq!(clean_response("regex: a:b"), "a:b");
        assert_eq!(clean_response("[a:z]+"), "[a:z]+");
    }

    #[test]
    fn test_clean_label_cascade() {
        // The second label check re-examines the output of the first
        assert_eq!(clean_response("Regex pattern: regex: \\d+"), "\\d+");
    }

    #[test]
    fn test_clean_fence_then_label() {
        assert_eq!(clean_response("```Regex: \\w+```"), "\\w+");
    }

    #[test]
    fn test_clean_empty_input() {
        assert_eq!(clean_response(""), "");
        assert_eq!(clean_response("   "), "");
    }

    #[test]
    fn test_clean_label_mid_text_untouched() {
        assert_eq!(clean_response("a regex: b"), "a regex: b");
    }
}

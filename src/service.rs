//! Request orchestration
//!
//! Ties the prompt templates, the LLM client, and the substitution
//! engine together into the one processing operation the API exposes.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::ai::{clean_response, LlmClient};
use crate::error::{ProcessError, ProcessResult};
use crate::prompt;
use crate::substitution::{self, ProcessedData};

/// Outcome of one processing request
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// The cleaned pattern that was applied
    pub generated_regex: String,
    /// The substituted data, re-parsed when possible
    pub processed: ProcessedData,
}

/// Orchestrates the two LLM generations and the substitution pass
#[derive(Clone)]
pub struct ProcessService {
    llm: Option<Arc<dyn LlmClient>>,
}

impl ProcessService {
    /// Create a service. Pass `None` when no credential is configured;
    /// processing requests then fail while the rest of the API stays up.
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    /// Generate a pattern and replacement for `query` and apply them to
    /// `data`.
    pub async fn process(&self, query: &str, data: &Value) -> ProcessResult<ProcessOutcome> {
        let llm = self.llm.as_ref().ok_or(ProcessError::LlmUnavailable)?;

        let pattern_prompt = prompt::regex_pattern_prompt(query);
        let replacement_prompt = prompt::replacement_text_prompt(query);

        // Independent generations; the pattern error wins when both fail
        let (pattern_result, replacement_result) = tokio::join!(
            llm.generate(&pattern_prompt),
            llm.generate(&replacement_prompt)
        );

        let pattern = clean_response(&pattern_result?);
        let replacement = clean_response(&replacement_result?);

        if pattern.is_empty() {
            return Err(ProcessError::EmptyPattern);
        }

        debug!(
            "applying substitution from {} (pattern: '{}', replacement: '{}')",
            llm.model_name(),
            pattern,
            replacement
        );

        let processed = substitution::apply(&pattern, &replacement, data)?;

        Ok(ProcessOutcome {
            generated_regex: pattern,
            processed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{LlmError, LlmResult};
    use async_trait::async_trait;
    use serde_json::json;

    struct ScriptedLlm {
        pattern: &'static str,
        replacement: &'static str,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(&self, prompt: &str) -> LlmResult<String> {
            // Only the replacement template mentions the exact replacement text
            if prompt.contains("exact replacement text") {
                Ok(self.replacement.to_string())
            } else {
                Ok(self.pattern.to_string())
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn generate(&self, _prompt: &str) -> LlmResult<String> {
            Err(LlmError::Blocked {
                reason: "SAFETY".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    struct BothFailLlm;

    #[async_trait]
    impl LlmClient for BothFailLlm {
        async fn generate(&self, prompt: &str) -> LlmResult<String> {
            let reason = if prompt.contains("exact replacement text") {
                "REPLACEMENT"
            } else {
                "PATTERN"
            };
            Err(LlmError::Blocked {
                reason: reason.to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "both-fail"
        }
    }

    fn service(pattern: &'static str, replacement: &'static str) -> ProcessService {
        ProcessService::new(Some(Arc::new(ScriptedLlm {
            pattern,
            replacement,
        })))
    }

    #[tokio::test]
    async fn test_process_success() {
        let svc = service(r"\d+", "X");
        let outcome = svc
            .process("replace digits with X", &json!({"a": 1, "b": 22}))
            .await
            .unwrap();

        assert_eq!(outcome.generated_regex, r"\d+");
        assert_eq!(
            outcome.processed,
            ProcessedData::Text(r#"{"a": X, "b": X}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_process_cleans_both_responses() {
        let svc = service("```\\d+```", "Regex: X");
        let outcome = svc.process("q", &json!({"n": 7})).await.unwrap();

        assert_eq!(outcome.generated_regex, r"\d+");
        assert_eq!(
            outcome.processed,
            ProcessedData::Text(r#"{"n": X}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_process_without_client() {
        let svc = ProcessService::new(None);
        let err = svc.process("q", &json!({})).await.unwrap_err();
        assert!(matches!(err, ProcessError::LlmUnavailable));
    }

    #[tokio::test]
    async fn test_process_empty_pattern() {
        let svc = service("``````", "X");
        let err = svc.process("q", &json!({})).await.unwrap_err();
        assert!(matches!(err, ProcessError::EmptyPattern));
    }

    #[tokio::test]
    async fn test_process_empty_replacement_is_allowed() {
        let svc = service("1", "");
        let outcome = svc.process("q", &json!([1])).await.unwrap();
        assert_eq!(outcome.processed, ProcessedData::Json(json!([])));
    }

    #[tokio::test]
    async fn test_process_invalid_pattern() {
        let svc = service("(unclosed", "X");
        let err = svc.process("q", &json!({})).await.unwrap_err();
        match err {
            ProcessError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_process_generation_failure() {
        let svc = ProcessService::new(Some(Arc::new(FailingLlm)));
        let err = svc.process("q", &json!({})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to get regex from LLM: LLM response was blocked or empty. Reason: SAFETY"
        );
    }

    #[tokio::test]
    async fn test_pattern_error_takes_precedence() {
        let svc = ProcessService::new(Some(Arc::new(BothFailLlm)));
        let err = svc.process("q", &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("PATTERN"));
    }
}

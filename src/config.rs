//! Environment-driven configuration
//!
//! Read once at startup. The Gemini credential is optional so the
//! process can come up and serve its health check without one.

use std::env;

use crate::ai::gemini::DEFAULT_MODEL;
use crate::ai::GeminiConfig;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Process-wide configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gemini API key (`GOOGLE_API_KEY`, falling back to `GEMINI_API_KEY`)
    pub api_key: Option<String>,
    /// Model id (`GEMINI_MODEL`)
    pub model: String,
    /// Per-call request timeout in seconds (`LLM_TIMEOUT_SECS`)
    pub timeout_seconds: u64,
    /// HTTP listen port (`PORT`)
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from the environment
    pub fn from_env() -> Self {
        let api_key =
            non_empty_var("GOOGLE_API_KEY").or_else(|| non_empty_var("GEMINI_API_KEY"));

        let model = non_empty_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_seconds = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            api_key,
            model,
            timeout_seconds,
            port,
        }
    }

    /// Gemini client configuration, when a credential is present
    pub fn gemini(&self) -> Option<GeminiConfig> {
        self.api_key.as_ref().map(|key| {
            GeminiConfig::new(key.clone())
                .with_model(self.model.clone())
                .with_timeout(self.timeout_seconds)
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

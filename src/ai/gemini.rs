//! Google Gemini API Client Implementation
//!
//! Minimal `generateContent` client used for regex and replacement-text
//! generation. Generation parameters are fixed: output is capped at 150
//! tokens with temperature 0.1 to bias toward a single stable answer,
//! and safety filtering is disabled for the call.

use super::{LlmClient, LlmError, LlmResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const MAX_OUTPUT_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.1;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Harm categories switched off for raw regex output
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini client configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for the Generative Language API
    pub api_key: String,
    /// Model name/version to use
    pub model: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl GeminiConfig {
    /// Create a new configuration with the default model and timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
    base_url: String,
}

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    safety_settings: Vec<GeminiSafetySetting>,
}

/// Gemini content structure
#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

/// Gemini content part
#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

/// Gemini generation configuration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Per-category safety threshold
#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    /// Absent entirely when the prompt is blocked
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

/// Gemini candidate response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    /// Absent on safety stops
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Gemini response content
#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

/// Gemini response part
#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Prompt-level feedback, set when the prompt itself was rejected
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Gemini usage metadata
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> LlmResult<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let base_url = "https://generativelanguage.googleapis.com/v1beta/models".to_string();

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    fn request_body(prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| GeminiSafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        }
    }

    /// Send one generation request to the Gemini API
    async fn send_request(&self, prompt: &str) -> LlmResult<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.config.model, self.config.api_key
        );

        debug!(
            "Sending request to Gemini API: {}",
            url.replace(&self.config.api_key, "***")
        );

        let response = self
            .client
            .post(&url)
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        debug!("Gemini API response status: {}", status);

        if !status.is_success() {
            error!("Gemini API error: {} - {}", status, response_text);
            return Err(LlmError::Api {
                status,
                body: response_text,
            });
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse Gemini response: {}", e);
                LlmError::Json(e)
            })?;

        extract_text(gemini_response)
    }
}

/// Pull the completion text out of a decoded response.
///
/// Zero candidates means the prompt was blocked; the failure carries the
/// provider's block reason when it supplied one, `Unknown (no candidates)`
/// otherwise. A candidate with no text part at all is an invalid
/// response, while a present-but-empty text part comes back as the empty
/// string and is handled downstream.
fn extract_text(response: GeminiResponse) -> LlmResult<String> {
    let GeminiResponse {
        candidates,
        prompt_feedback,
        usage_metadata,
    } = response;

    if let Some(usage) = &usage_metadata {
        info!(
            "Gemini API usage - Prompt: {:?} tokens, Response: {:?} tokens, Total: {:?} tokens",
            usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
        );
    }

    let candidate = match candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let reason = prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .unwrap_or_else(|| "Unknown (no candidates)".to_string());
            return Err(LlmError::Blocked { reason });
        }
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.iter().all(|part| part.text.is_none()) {
        return Err(LlmError::InvalidResponse(format!(
            "candidate contained no text parts (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(parts.into_iter().filter_map(|part| part.text).collect())
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> LlmResult<String> {
        self.send_request(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

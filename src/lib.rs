//! Natural-language regex replacement service
//!
//! Takes a natural-language instruction plus arbitrary JSON, asks
//! Gemini for a regular expression and a replacement string, applies
//! the substitution to the serialized form of the data, and returns
//! both the original and the transformed result.
//!
//! The pieces compose left to right: [`prompt`] builds the two
//! generation prompts, [`ai`] talks to the provider and cleans its
//! output, [`substitution`] compiles and applies the pattern, and
//! [`service::ProcessService`] orchestrates one request. [`api`]
//! exposes the pipeline over HTTP.

pub mod ai;
pub mod api;
pub mod config;
pub mod error;
pub mod prompt;
pub mod service;
pub mod substitution;

pub use ai::{clean_response, GeminiClient, GeminiConfig, LlmClient, LlmError, LlmResult};
pub use api::create_process_router;
pub use config::AppConfig;
pub use error::{ProcessError, ProcessResult};
pub use service::{ProcessOutcome, ProcessService};
pub use substitution::ProcessedData;

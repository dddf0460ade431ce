//! Text-processing API routes
//!
//! `GET /` health check plus `POST /process-text/`, the main operation.
//! Request validation reports per-field error lists in one 400 body,
//! so a request missing both fields gets both messages at once.

use crate::error::ProcessError;
use crate::service::{ProcessOutcome, ProcessService};
use crate::substitution::ProcessedData;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state for the process routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProcessService>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

const MAX_QUERY_LENGTH: usize = 500;

/// Validated input for `/process-text/`
#[derive(Debug)]
struct ProcessTextRequest {
    natural_language_query: String,
    data: Value,
    /// Accepted and validated for wire compatibility, never read
    #[allow(dead_code)]
    replacement_text: Option<String>,
}

/// Success body for `/process-text/`
#[derive(Debug, Serialize)]
struct ProcessTextResponse {
    generated_regex: String,
    original_data: Value,
    processed_data: ProcessedData,
    message: String,
}

// ============================================================================
// Request Validation
// ============================================================================

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn field_error(errors: &mut Map<String, Value>, field: &str, message: &str) {
    errors.insert(field.to_string(), json!([message]));
}

/// Validate the request body, collecting every field error.
///
/// The error value is the response body: a map from field name to a
/// list of messages, or `non_field_errors` when the body is not an
/// object at all.
fn validate_request(body: &Value) -> Result<ProcessTextRequest, Value> {
    let Some(fields) = body.as_object() else {
        return Err(json!({
            "non_field_errors": [format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(body)
            )]
        }));
    };

    let mut errors = Map::new();

    let natural_language_query = match fields.get("natural_language_query") {
        None => {
            field_error(&mut errors, "natural_language_query", "This field is required.");
            None
        }
        Some(Value::Null) => {
            field_error(&mut errors, "natural_language_query", "This field may not be null.");
            None
        }
        Some(Value::String(query)) => {
            let trimmed = query.trim();
            if trimmed.is_empty() {
                field_error(&mut errors, "natural_language_query", "This field may not be blank.");
                None
            } else if trimmed.chars().count() > MAX_QUERY_LENGTH {
                field_error(
                    &mut errors,
                    "natural_language_query",
                    "Ensure this field has no more than 500 characters.",
                );
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(_) => {
            field_error(&mut errors, "natural_language_query", "Not a valid string.");
            None
        }
    };

    let data = match fields.get("data") {
        None => {
            field_error(&mut errors, "data", "This field is required.");
            None
        }
        Some(Value::Null) => {
            field_error(&mut errors, "data", "This field may not be null.");
            None
        }
        Some(value) => Some(value.clone()),
    };

    let replacement_text = match fields.get("replacement_text") {
        None => None,
        Some(Value::Null) => {
            field_error(&mut errors, "replacement_text", "This field may not be null.");
            None
        }
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            field_error(&mut errors, "replacement_text", "Not a valid string.");
            None
        }
    };

    match (natural_language_query, data) {
        (Some(natural_language_query), Some(data)) if errors.is_empty() => {
            Ok(ProcessTextRequest {
                natural_language_query,
                data,
                replacement_text,
            })
        }
        _ => Err(Value::Object(errors)),
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ProcessError::InvalidPattern { pattern, .. } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": self.to_string(),
                    "generated_regex": pattern,
                }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        if status.is_server_error() {
            error!("processing request failed: {}", self);
        } else {
            warn!("rejected generated pattern: {}", self);
        }

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /` health check, served regardless of LLM configuration
async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// `POST /process-text/`
async fn process_text(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProcessTextResponse>, Response> {
    let Json(body) = payload.map_err(|rejection| {
        (
            rejection.status(),
            Json(json!({"detail": rejection.body_text()})),
        )
            .into_response()
    })?;

    let request = validate_request(&body)
        .map_err(|errors| (StatusCode::BAD_REQUEST, Json(errors)).into_response())?;

    let ProcessOutcome {
        generated_regex,
        processed,
    } = state
        .service
        .process(&request.natural_language_query, &request.data)
        .await
        .map_err(IntoResponse::into_response)?;

    info!("processed request (pattern: '{}')", generated_regex);

    Ok(Json(ProcessTextResponse {
        generated_regex,
        original_data: request.data,
        processed_data: processed,
        message: "Data processed successfully.".to_string(),
    }))
}

// ============================================================================
// Router
// ============================================================================

/// Build the router for the processing API
pub fn create_process_router(service: Arc<ProcessService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/", get(health_check))
        .route("/process-text/", post(process_text))
        .with_state(state)
}

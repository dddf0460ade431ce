//! Server entry point
//!
//! Builds the (optional) Gemini client from the environment, wires it
//! into the processing router, and serves on `0.0.0.0:{PORT}`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use llm_regex::{create_process_router, AppConfig, GeminiClient, LlmClient, ProcessService};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("llm_regex=debug,llm_regex_server=debug,tower_http=debug")
        }))
        .init();

    let config = AppConfig::from_env();

    let llm: Option<Arc<dyn LlmClient>> = match config.gemini() {
        Some(gemini_config) => {
            let client = GeminiClient::new(gemini_config)?;
            info!("Gemini client ready (model: {})", client.model_name());
            Some(Arc::new(client))
        }
        None => {
            warn!("GOOGLE_API_KEY not found in environment; /process-text/ requests will fail");
            None
        }
    };

    let service = Arc::new(ProcessService::new(llm));

    // CORS stays permissive; the browser frontend is served from
    // another origin.
    let app = create_process_router(service).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("llm-regex server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! HTTP API surface

pub mod process_routes;

pub use process_routes::{create_process_router, AppState};

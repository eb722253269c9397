use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, store::DatasetStore};

/// Create the main application router with all API endpoints
pub fn create_router(store: Arc<DatasetStore>) -> Router {
    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    Router::new()
        .route("/", get(handlers::root))
        // Health check
        .route("/health", get(handlers::health_check))
        // Dataset lifecycle
        .route("/api/status", get(handlers::get_status))
        .route("/api/upload", post(handlers::upload_report))
        // Aggregation endpoints
        .route("/api/pivot", get(handlers::get_pivot))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/currencies", get(handlers::get_currencies))
        // Add shared state
        .with_state(store)
        // Reports are bigger than the default multipart body cap
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

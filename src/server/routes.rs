//! Router configuration for the receipt API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/v1/upload", post(handlers::upload))
        .route("/api/v1/validate", post(handlers::validate))
        .route("/api/v1/process", post(handlers::process))
        .route("/api/v1/receipts", get(handlers::list_receipts))
        .route("/api/v1/receipts/:id", get(handlers::get_receipt))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

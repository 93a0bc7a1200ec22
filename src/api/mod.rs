//! REST API module using Axum
//!
//! - `POST /ask`: grounded answer plus the hits it was grounded on
//! - `GET /healthz`: liveness of the vector store
//! - `GET /spells`: paged catalog listing
//!
//! Error bodies are plain text; see [`error`] for the status mapping.

pub mod error;
pub mod handlers;
mod routes;

pub use error::ApiError;
pub use handlers::ApiState;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Same-origin only unless `server.cors_origins` lists origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        return base;
    }

    let allowed: Vec<_> = origins.iter().filter_map(|o| o.trim().parse().ok()).collect();
    tracing::info!(origins = %origins.join(","), "CORS: allowing configured origins");
    base.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: ApiState) -> Router {
    let cors = build_cors_layer(&state.server.cors_origins);
    let body_limit = state.server.max_body_bytes;

    routes::api_routes(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

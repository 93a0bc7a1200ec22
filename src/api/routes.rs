use super::handlers::{self, ApiState};
use axum::routing::{get, post};
use axum::Router;

pub(super) fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/healthz", get(handlers::healthz))
        .route("/spells", get(handlers::list_spells))
        .with_state(state)
}

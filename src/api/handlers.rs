//! HTTP request handlers

use super::error::ApiError;
use crate::config::{ServerConfig, TimeoutConfig};
use crate::pipeline::Pipeline;
use crate::store::{HealthProbe, SearchError, SpellCatalog};
use crate::types::{AnswerResult, AskRequest, CatalogEntry};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query as QueryParams, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
    pub health: Arc<dyn HealthProbe>,
    pub catalog: Arc<dyn SpellCatalog>,
    pub timeouts: TimeoutConfig,
    pub server: ServerConfig,
}

/// POST /ask
pub async fn ask(
    State(state): State<ApiState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerResult>, ApiError> {
    let Json(request) = body.map_err(|e| {
        debug!("Rejected /ask body: {e}");
        ApiError::InvalidBody
    })?;

    let deadline = Instant::now() + state.timeouts.request();
    let result = state.pipeline.ask(request, deadline).await?;
    Ok(Json(result))
}

/// GET /healthz
pub async fn healthz(State(state): State<ApiState>) -> Response {
    let budget = state.timeouts.health();
    match tokio::time::timeout(budget, state.health.ping()).await {
        Ok(Ok(())) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Ok(Err(e)) => {
            warn!("Health probe failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, format!("db not ok: {e}")).into_response()
        }
        Err(_) => {
            warn!(budget_ms = budget.as_millis() as u64, "Health probe timed out");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("db not ok: no response within {budget:?}"),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    /// `(offset, limit)` with the limit clamped and negative offsets floored.
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (offset, limit)
    }
}

/// GET /spells
pub async fn list_spells(
    State(state): State<ApiState>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let (offset, limit) = params.resolve();
    let budget = state.timeouts.search();
    let entries = tokio::time::timeout(budget, state.catalog.list(offset, limit))
        .await
        .map_err(|_| SearchError::Timeout(budget))??;
    Ok(Json(entries))
}

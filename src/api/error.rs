//! Mapping of pipeline failures to plain-text HTTP responses
//!
//! | Failure                         | Status |
//! |---------------------------------|--------|
//! | malformed body / empty query    | 400    |
//! | any stage timeout               | 504    |
//! | embedding / generation failure  | 502    |
//! | vector store failure            | 500    |

use crate::pipeline::{FailureKind, PipelineError};
use crate::store::SearchError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

const INVALID_BODY: &str = "invalid body; need {query}";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid body; need {{query}}")]
    InvalidBody,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("db query error: {0}")]
    Catalog(#[from] SearchError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::Pipeline(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Pipeline(e) => match e.kind() {
                FailureKind::InvalidInput => StatusCode::BAD_REQUEST,
                FailureKind::EmbeddingFailure | FailureKind::SynthesisFailure => {
                    StatusCode::BAD_GATEWAY
                }
                FailureKind::SearchFailure => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(SearchError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Pipeline(e) if e.kind() == FailureKind::InvalidInput => INVALID_BODY.to_string(),
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

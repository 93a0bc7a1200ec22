//! Embedding stage: query text → one vector

use crate::llm::{CapabilityError, Embedder};
use crate::types::EmbeddingVector;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("empty text")]
    EmptyInput,
    #[error("embedding capability unavailable: {0}")]
    CapabilityUnavailable(#[from] CapabilityError),
    #[error("embedding capability returned no vector")]
    EmptyResult,
    #[error("embedding timed out after {0:?}")]
    Timeout(Duration),
}

/// Wraps an [`Embedder`] with input validation and result checks.
/// No retries; every failure is terminal for the request.
#[derive(Clone)]
pub struct EmbeddingClient {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingClient {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbedError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let vectors = self.embedder.embed(&[text.to_string()]).await?;
        match vectors.into_iter().next() {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(EmbedError::EmptyResult),
        }
    }
}

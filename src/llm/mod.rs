//! External model capabilities
//!
//! Two narrow traits, one method each, so the pipeline can run against
//! deterministic fakes:
//!
//! - **Embedder**: text → one vector per input
//! - **TextGenerator**: prompt → ordered text fragments from all candidates
//!
//! `GeminiClient` implements both over the Generative Language REST API.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

/// Transport, auth or protocol failure talking to a model capability
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("capability returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unreadable capability response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("API key is not configured")]
    MissingApiKey,
}

/// Unified trait for embedding backends
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each input text; the result holds one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, CapabilityError>;
}

/// Unified trait for text generation backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Text fragments of every returned candidate, in response order.
    async fn generate(&self, prompt: &str) -> Result<Vec<String>, CapabilityError>;
}

//! Gemini REST backend (embeddings + generation)
//!
//! Endpoints, relative to `base_url`:
//! - `POST /v1beta/models/{model}:batchEmbedContents`
//! - `POST /v1beta/models/{model}:generateContent`
//!
//! The API key travels in the `x-goog-api-key` header so it never appears in
//! request URLs or access logs. Per-call deadlines are owned by the caller;
//! the shared client only bounds connection setup.

use super::{CapabilityError, Embedder, TextGenerator};
use crate::config::GeminiConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";
/// Error bodies are cut to this many chars before being surfaced
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client for the Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    generation_model: String,
    embedding_model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("generation_model", &self.generation_model)
            .field("embedding_model", &self.embedding_model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, CapabilityError> {
        if config.api_key.trim().is_empty() {
            return Err(CapabilityError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            generation_model: config.generation_model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    async fn post<B, R>(&self, url: String, body: &B) -> Result<R, CapabilityError>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: String = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(CapabilityError::Status { status, body });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, CapabilityError> {
        let start = Instant::now();
        let model = format!("models/{}", self.embedding_model);
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: &model,
                    content: Content::user_text(text),
                })
                .collect(),
        };

        let resp: BatchEmbedResponse = self
            .post(self.endpoint(&self.embedding_model, "batchEmbedContents"), &request)
            .await?;

        debug!(
            model = %self.embedding_model,
            vectors = resp.embeddings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Gemini embedding complete"
        );

        Ok(resp.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<String>, CapabilityError> {
        let start = Instant::now();
        let request = GenerateRequest {
            contents: vec![Content::user_text(prompt)],
        };

        let resp: GenerateResponse = self
            .post(self.endpoint(&self.generation_model, "generateContent"), &request)
            .await?;

        let fragments: Vec<String> = resp
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();

        debug!(
            model = %self.generation_model,
            fragments = fragments.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Gemini generation complete"
        );

        Ok(fragments)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

impl<'a> Content<'a> {
    fn user_text(text: &'a str) -> Self {
        Self {
            role: "user",
            parts: vec![Part { text }],
        }
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f64>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    /// Absent when the candidate was blocked
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

//! Pipeline Orchestrator - sequences one grounded answer under a deadline
//!
//! ```text
//! Validating ──► Embedding ──► Searching ──► Synthesizing ──► Done
//!     │              │             │               │
//!     └──────────────┴─────────────┴───────────────┴──► Failed(kind)
//! ```
//!
//! Each stage needs the previous stage's output, so stages never overlap.
//! A failed stage returns immediately; later stages are never invoked and no
//! partial result escapes.
//!
//! Every external call gets its own child deadline:
//! `min(now + stage_budget, request_deadline)`. Dropping the returned future
//! cancels whichever call is in flight.

use super::embed::{EmbedError, EmbeddingClient};
use super::synthesis::{AnswerSynthesizer, SynthesisError};
use crate::config::TimeoutConfig;
use crate::llm::{Embedder, TextGenerator};
use crate::store::{SearchError, SearchPlan, SpellStore};
use crate::types::{AnswerResult, AskRequest, Query, QueryError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Request lifecycle position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Embedding,
    Searching,
    Synthesizing,
    Done,
}

/// Response-level failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    EmbeddingFailure,
    SearchFailure,
    SynthesisFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] QueryError),
    #[error("embed error: {0}")]
    Embedding(#[from] EmbedError),
    #[error("db query error: {0}")]
    Search(#[from] SearchError),
    #[error("generation error: {0}")]
    Synthesis(#[from] SynthesisError),
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            // A blank query reaching a stage is still the caller's fault.
            Self::Embedding(EmbedError::EmptyInput) | Self::Synthesis(SynthesisError::EmptyInput) => {
                FailureKind::InvalidInput
            }
            Self::Embedding(_) => FailureKind::EmbeddingFailure,
            Self::Search(_) => FailureKind::SearchFailure,
            Self::Synthesis(_) => FailureKind::SynthesisFailure,
        }
    }

    /// Stage the request was in when it failed
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidInput(_) => Stage::Validating,
            Self::Embedding(_) => Stage::Embedding,
            Self::Search(_) => Stage::Searching,
            Self::Synthesis(_) => Stage::Synthesizing,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Embedding(EmbedError::Timeout(_))
                | Self::Search(SearchError::Timeout(_))
                | Self::Synthesis(SynthesisError::Timeout(_))
        )
    }
}

/// Per-call budgets for the three external calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub embed: Duration,
    pub search: Duration,
    pub generate: Duration,
}

impl From<&TimeoutConfig> for StageTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            embed: config.embed(),
            search: config.search(),
            generate: config.generate(),
        }
    }
}

/// Embed → search → synthesize, with no state shared between requests
#[derive(Clone)]
pub struct Pipeline {
    embedder: EmbeddingClient,
    store: Arc<dyn SpellStore>,
    synthesizer: AnswerSynthesizer,
    timeouts: StageTimeouts,
}

impl Pipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn SpellStore>,
        generator: Arc<dyn TextGenerator>,
        timeouts: StageTimeouts,
    ) -> Self {
        Self {
            embedder: EmbeddingClient::new(embedder),
            store,
            synthesizer: AnswerSynthesizer::new(generator),
            timeouts,
        }
    }

    /// Validate a raw request, then answer it.
    pub async fn ask(
        &self,
        request: AskRequest,
        deadline: Instant,
    ) -> Result<AnswerResult, PipelineError> {
        let request_id = Uuid::new_v4();
        async move {
            debug!(stage = ?Stage::Validating, "Validating request");
            let query = match Query::try_from(request) {
                Ok(q) => q,
                Err(e) => {
                    warn!(kind = ?FailureKind::InvalidInput, "Rejected request: {e}");
                    return Err(PipelineError::from(e));
                }
            };
            self.answer(&query, deadline).await
        }
        .instrument(info_span!("ask", %request_id))
        .await
    }

    /// Run the three stages for an already validated query.
    pub async fn answer(
        &self,
        query: &Query,
        deadline: Instant,
    ) -> Result<AnswerResult, PipelineError> {
        let start = Instant::now();
        let result = self.run_stages(query, deadline).await;

        match &result {
            Ok(answer) => info!(
                query = %query.preview(),
                hits = answer.hits.len(),
                answer_chars = answer.answer.chars().count(),
                total_ms = start.elapsed().as_millis() as u64,
                "Answered query"
            ),
            Err(e) => warn!(
                query = %query.preview(),
                stage = ?e.stage(),
                kind = ?e.kind(),
                timeout = e.is_timeout(),
                total_ms = start.elapsed().as_millis() as u64,
                "Query failed: {e}"
            ),
        }
        result
    }

    async fn run_stages(
        &self,
        query: &Query,
        deadline: Instant,
    ) -> Result<AnswerResult, PipelineError> {
        // Embedding
        let (child, budget) = child_deadline(self.timeouts.embed, deadline);
        let stage_start = Instant::now();
        let vector = timeout_at(child, self.embedder.embed(query.text()))
            .await
            .map_err(|_| EmbedError::Timeout(budget))??;
        debug!(
            stage = ?Stage::Embedding,
            dimensions = vector.len(),
            elapsed_ms = stage_start.elapsed().as_millis() as u64,
            "Stage complete"
        );

        // Searching
        let plan = SearchPlan::new(&vector, query);
        let (child, budget) = child_deadline(self.timeouts.search, deadline);
        let stage_start = Instant::now();
        let hits = timeout_at(child, self.store.search(&plan))
            .await
            .map_err(|_| SearchError::Timeout(budget))??;
        debug!(
            stage = ?Stage::Searching,
            hits = hits.len(),
            elapsed_ms = stage_start.elapsed().as_millis() as u64,
            "Stage complete"
        );

        // Synthesizing runs even with zero hits; the model phrases "nothing found".
        let (child, budget) = child_deadline(self.timeouts.generate, deadline);
        let stage_start = Instant::now();
        let answer = timeout_at(child, self.synthesizer.synthesize(query.text(), &hits))
            .await
            .map_err(|_| SynthesisError::Timeout(budget))??;
        debug!(
            stage = ?Stage::Synthesizing,
            elapsed_ms = stage_start.elapsed().as_millis() as u64,
            "Stage complete"
        );

        debug!(stage = ?Stage::Done, "Pipeline complete");
        Ok(AnswerResult { answer, hits })
    }
}

/// The child deadline and the budget it actually leaves.
fn child_deadline(stage_budget: Duration, parent: Instant) -> (Instant, Duration) {
    let now = Instant::now();
    let child = (now + stage_budget).min(parent);
    (child, child.saturating_duration_since(now))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_deadline_capped_by_parent() {
        let parent = Instant::now() + Duration::from_millis(100);
        let (child, budget) = child_deadline(Duration::from_secs(20), parent);
        assert_eq!(child, parent);
        assert!(budget <= Duration::from_millis(100));
    }

    #[test]
    fn test_child_deadline_uses_stage_budget_when_smaller() {
        let parent = Instant::now() + Duration::from_secs(60);
        let (child, budget) = child_deadline(Duration::from_secs(2), parent);
        assert!(child < parent);
        assert_eq!(budget, Duration::from_secs(2));
    }

    #[test]
    fn test_expired_parent_leaves_zero_budget() {
        let parent = Instant::now();
        let (_, budget) = child_deadline(Duration::from_secs(5), parent);
        assert_eq!(budget, Duration::ZERO);
    }

    #[test]
    fn test_error_kinds() {
        let e = PipelineError::from(QueryError::EmptyQuery);
        assert_eq!(e.kind(), FailureKind::InvalidInput);
        assert_eq!(e.stage(), Stage::Validating);

        let e = PipelineError::from(EmbedError::EmptyResult);
        assert_eq!(e.kind(), FailureKind::EmbeddingFailure);
        assert!(!e.is_timeout());

        let e = PipelineError::from(EmbedError::EmptyInput);
        assert_eq!(e.kind(), FailureKind::InvalidInput);

        let e = PipelineError::from(SearchError::Timeout(Duration::from_secs(1)));
        assert_eq!(e.kind(), FailureKind::SearchFailure);
        assert_eq!(e.stage(), Stage::Searching);
        assert!(e.is_timeout());

        let e = PipelineError::from(SynthesisError::EmptyInput);
        assert_eq!(e.kind(), FailureKind::InvalidInput);
        assert_eq!(e.stage(), Stage::Synthesizing);
    }

    #[test]
    fn test_stage_timeouts_from_config() {
        let t = StageTimeouts::from(&TimeoutConfig::default());
        assert_eq!(t.embed, Duration::from_secs(20));
        assert_eq!(t.search, Duration::from_secs(15));
        assert_eq!(t.generate, Duration::from_secs(30));
    }
}

//! Three-stage retrieval pipeline
//!
//! - `embed`: query text → embedding vector
//! - `synthesis`: query + hits → grounded answer text
//! - `orchestrator`: sequencing, deadlines and failure mapping
//!
//! The search stage lives in [`crate::store`].

pub mod embed;
pub mod orchestrator;
pub mod synthesis;

pub use embed::{EmbedError, EmbeddingClient};
pub use orchestrator::{FailureKind, Pipeline, PipelineError, Stage, StageTimeouts};
pub use synthesis::{AnswerSynthesizer, SynthesisError, GROUNDING_INSTRUCTION};

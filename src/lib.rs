//! searchspell: grounded question answering over a spell wiki
//!
//! Each question runs through three sequential stages:
//!
//! - **Embedding**: the query text becomes a vector (Gemini `text-embedding-004`)
//! - **Searching**: pgvector nearest-neighbour lookup, optionally filtered
//! - **Synthesizing**: Gemini composes an answer restricted to the retrieved records
//!
//! The external capabilities sit behind traits ([`llm::Embedder`],
//! [`llm::TextGenerator`], [`store::SpellStore`]) so the pipeline can be
//! exercised without a network.

pub mod api;
pub mod codec;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use pipeline::{FailureKind, Pipeline, PipelineError, Stage, StageTimeouts};
pub use types::{AnswerResult, AskRequest, CatalogEntry, Hit, Query, QueryError};

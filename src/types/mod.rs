//! Request-scoped value objects for the retrieval pipeline
//!
//! - `Query`: validated question plus optional filters
//! - `Hit`: one retrieved record with its distance
//! - `GroundingBrief`: the slice of a `Hit` the generator is allowed to see
//! - `AnswerResult`: answer text plus the hits it was grounded on
//!
//! None of these outlive a single request.

mod hit;
mod query;

pub use hit::*;
pub use query::*;

/// Query embedding; dimension is whatever the embedding model produces
pub type EmbeddingVector = Vec<f64>;

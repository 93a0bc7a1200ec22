//! Vector store access
//!
//! The pipeline only sees [`SpellStore`]; nearest-neighbour computation is
//! delegated to the backing store. [`SearchPlan`] is the query-building step:
//! it is the one place where optional filters become the store's NULLs.
//!
//! ## Filtering
//!
//! - `only_flag = Some(b)`: exact match on the boolean flag column
//! - `realities = Some(set)`: record matches when any of `set` is among its realities
//! - both absent: every record is a candidate
//!
//! Results are ordered by ascending distance and truncated to `limit`. Ties
//! keep whatever order the store returns.

mod postgres;

pub use postgres::{create_pool, PgSpellStore};

use crate::codec;
use crate::types::{CatalogEntry, Hit, Query};
use async_trait::async_trait;
use std::time::Duration;

/// Search stage failures
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("vector store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
    #[error("malformed row (column {column}): {reason}")]
    MalformedRow { column: &'static str, reason: String },
    #[error("vector store query timed out after {0:?}")]
    Timeout(Duration),
}

/// One ordered, limited nearest-neighbour query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    /// pgvector literal of the query embedding
    pub vector_literal: String,
    pub only_flag: Option<bool>,
    /// `None` when the caller's filter set is empty
    pub realities: Option<Vec<String>>,
    pub limit: i64,
}

impl SearchPlan {
    pub fn new(vector: &[f64], query: &Query) -> Self {
        let realities = if query.realities().is_empty() {
            None
        } else {
            Some(query.realities().iter().cloned().collect())
        };

        Self {
            vector_literal: codec::encode_vector(vector),
            only_flag: query.only_flag(),
            realities,
            limit: i64::try_from(query.top_k()).unwrap_or(i64::MAX),
        }
    }
}

/// Nearest-neighbour search over the record collection
#[async_trait]
pub trait SpellStore: Send + Sync {
    /// Hits ordered by ascending distance, at most `plan.limit` of them.
    async fn search(&self, plan: &SearchPlan) -> Result<Vec<Hit>, SearchError>;
}

/// Liveness of the backing store
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

/// Paged listing of the record collection
#[async_trait]
pub trait SpellCatalog: Send + Sync {
    /// Records ordered by id.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<CatalogEntry>, SearchError>;
}

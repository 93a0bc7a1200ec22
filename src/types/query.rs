//! Inbound query: wire shape and validated domain form

use serde::Deserialize;
use std::collections::BTreeSet;

/// Default number of hits when `top_k` is missing or out of range
pub const DEFAULT_TOP_K: usize = 6;
/// Largest accepted `top_k`
pub const MAX_TOP_K: usize = 50;

/// JSON body accepted by `POST /ask`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub only_strange: Option<bool>,
    /// Matches any of the listed realities
    #[serde(default)]
    pub realities: Option<Vec<String>>,
}

/// Rejection raised before any external call is made
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query is empty")]
    EmptyQuery,
}

/// A validated query.
///
/// `text` is trimmed and non-empty, `top_k` is within `[1, MAX_TOP_K]` and an
/// empty `realities` set means "no reality filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    top_k: usize,
    only_flag: Option<bool>,
    realities: BTreeSet<String>,
}

impl Query {
    pub fn new(
        text: &str,
        top_k: Option<i64>,
        only_flag: Option<bool>,
        realities: impl IntoIterator<Item = String>,
    ) -> Result<Self, QueryError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let realities = realities
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        Ok(Self {
            text: text.to_string(),
            top_k: effective_top_k(top_k),
            only_flag,
            realities,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn only_flag(&self) -> Option<bool> {
        self.only_flag
    }

    pub fn realities(&self) -> &BTreeSet<String> {
        &self.realities
    }

    /// Short prefix of the query text for log lines.
    pub fn preview(&self) -> String {
        self.text.chars().take(64).collect()
    }
}

impl TryFrom<AskRequest> for Query {
    type Error = QueryError;

    fn try_from(req: AskRequest) -> Result<Self, Self::Error> {
        Self::new(
            &req.query,
            req.top_k,
            req.only_strange,
            req.realities.unwrap_or_default(),
        )
    }
}

/// Out-of-range and missing values fall back to the default rather than
/// being clamped to the nearest bound.
pub fn effective_top_k(requested: Option<i64>) -> usize {
    match requested {
        Some(k) if k >= 1 && k <= MAX_TOP_K as i64 => k as usize,
        _ => DEFAULT_TOP_K,
    }
}

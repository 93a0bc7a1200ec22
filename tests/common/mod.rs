//! Deterministic fakes for the pipeline's external capabilities.
#![allow(dead_code)]

use async_trait::async_trait;
use searchspell::llm::{CapabilityError, Embedder, TextGenerator};
use searchspell::store::{HealthProbe, SearchError, SearchPlan, SpellCatalog, SpellStore};
use searchspell::types::{CatalogEntry, Hit};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn hit(id: i64, title: &str, distance: f64) -> Hit {
    Hit {
        id,
        title: title.to_string(),
        summary: format!("{title} is a spell."),
        url: format!("https://marvel.fandom.com/wiki/{}", title.replace(' ', "_")),
        image_url: None,
        realities: vec!["Earth-616".to_string()],
        categories: vec!["Spells".to_string()],
        flag: true,
        distance,
    }
}

pub fn entry(id: i64, title: &str) -> CatalogEntry {
    let h = hit(id, title, 0.0);
    CatalogEntry {
        id: h.id,
        title: h.title,
        summary: h.summary,
        url: h.url,
        image_url: h.image_url,
        realities: h.realities,
        categories: h.categories,
        flag: h.flag,
    }
}

fn unavailable(what: &str) -> CapabilityError {
    CapabilityError::Status {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: format!("{what} overloaded"),
    }
}

// ============================================================================
// Embedder
// ============================================================================

pub struct FakeEmbedder {
    pub vectors: Vec<Vec<f64>>,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn returning(vector: Vec<f64>) -> Self {
        Self {
            vectors: vec![vector],
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(Vec::new())
        }
    }

    pub fn empty() -> Self {
        Self {
            vectors: Vec::new(),
            ..Self::returning(Vec::new())
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::returning(vec![0.1, 0.2, 0.3])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f64>>, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail {
            return Err(unavailable("embedder"));
        }
        Ok(self.vectors.clone())
    }
}

// ============================================================================
// Store
// ============================================================================

pub struct FakeStore {
    pub hits: Vec<Hit>,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub plans: Mutex<Vec<SearchPlan>>,
}

impl FakeStore {
    pub fn with_hits(hits: Vec<Hit>) -> Self {
        Self {
            hits,
            fail: false,
            delay: None,
            plans: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_hits(Vec::new())
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::with_hits(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.plans.lock().unwrap().len()
    }

    pub fn last_plan(&self) -> Option<SearchPlan> {
        self.plans.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SpellStore for FakeStore {
    async fn search(&self, plan: &SearchPlan) -> Result<Vec<Hit>, SearchError> {
        self.plans.lock().unwrap().push(plan.clone());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail {
            return Err(SearchError::StoreUnavailable(sqlx::Error::PoolTimedOut));
        }
        let limit = usize::try_from(plan.limit).unwrap_or(0);
        Ok(self.hits.iter().take(limit).cloned().collect())
    }
}

// ============================================================================
// Generator
// ============================================================================

pub struct FakeGenerator {
    pub fragments: Vec<String>,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn answering(text: &str) -> Self {
        Self {
            fragments: vec![text.to_string()],
            fail: false,
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn fragments(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            ..Self::answering("")
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::answering("")
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::answering("late")
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<Vec<String>, CapabilityError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail {
            return Err(unavailable("generator"));
        }
        Ok(self.fragments.clone())
    }
}

// ============================================================================
// Health + catalog
// ============================================================================

pub struct FakeHealth {
    pub healthy: bool,
    pub delay: Option<Duration>,
}

#[async_trait]
impl HealthProbe for FakeHealth {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.healthy {
            Ok(())
        } else {
            Err(sqlx::Error::Protocol("connection refused".to_string()))
        }
    }
}

pub struct FakeCatalog {
    pub entries: Vec<CatalogEntry>,
    pub fail: bool,
    pub pages: Mutex<Vec<(i64, i64)>>,
}

impl FakeCatalog {
    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            fail: false,
            pages: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SpellCatalog for FakeCatalog {
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<CatalogEntry>, SearchError> {
        self.pages.lock().unwrap().push((offset, limit));
        if self.fail {
            return Err(SearchError::StoreUnavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .entries
            .iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}

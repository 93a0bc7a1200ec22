//! Config validation: unknown-key detection with "did you mean?" suggestions
//! and range checks.
//!
//! Unknown keys are found by walking the raw `toml::Value` before serde sees
//! it. They only produce warnings, so a config written for a newer build
//! still loads.

use super::AppConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of `AppConfig`.
///
/// Kept by hand in step with the structs in `mod.rs`.
pub const KNOWN_CONFIG_KEYS: &[&str] = &[
    // [server]
    "server",
    "server.listen_addr",
    "server.max_body_bytes",
    "server.cors_origins",
    // [database]
    "database",
    "database.url",
    "database.table",
    "database.max_connections",
    "database.min_connections",
    "database.max_lifetime_secs",
    "database.idle_timeout_secs",
    "database.acquire_timeout_secs",
    // [gemini]
    "gemini",
    "gemini.api_key",
    "gemini.base_url",
    "gemini.generation_model",
    "gemini.embedding_model",
    "gemini.connect_timeout_ms",
    // [timeouts]
    "timeouts",
    "timeouts.request_ms",
    "timeouts.embed_ms",
    "timeouts.search_ms",
    "timeouts.generate_ms",
    "timeouts.health_ms",
];

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collects all dotted key paths of a `toml::Value` tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3; ties go to the first listed key.
pub fn suggest_correction(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| k.to_string())
}

/// Warnings for every key in `raw_toml` that `AppConfig` does not know.
///
/// Parse errors yield no warnings; serde reports them afterwards.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !KNOWN_CONFIG_KEYS.contains(&key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, KNOWN_CONFIG_KEYS),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// `schema.table` or `table`, each part a plain SQL identifier.
pub fn is_plain_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Returns (errors, warnings). Errors must prevent startup.
pub fn validate_ranges(config: &AppConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let t = &config.timeouts;

    for (name, value) in [
        ("timeouts.request_ms", t.request_ms),
        ("timeouts.embed_ms", t.embed_ms),
        ("timeouts.search_ms", t.search_ms),
        ("timeouts.generate_ms", t.generate_ms),
        ("timeouts.health_ms", t.health_ms),
    ] {
        if value == 0 {
            errors.push(format!("{name} must be > 0"));
        }
    }

    // A stage budget above the request budget is silently capped at runtime.
    for (name, value) in [
        ("timeouts.embed_ms", t.embed_ms),
        ("timeouts.search_ms", t.search_ms),
        ("timeouts.generate_ms", t.generate_ms),
    ] {
        if value > t.request_ms {
            warnings.push(ValidationWarning {
                field: name.to_string(),
                message: format!(
                    "{name} = {value} exceeds timeouts.request_ms = {}; the request budget wins",
                    t.request_ms
                ),
                suggestion: None,
            });
        }
    }

    let db = &config.database;
    if !is_plain_table_name(&db.table) {
        errors.push(format!(
            "database.table = '{}' is not a plain SQL identifier",
            db.table
        ));
    }
    if db.max_connections == 0 {
        errors.push("database.max_connections must be > 0".to_string());
    }
    if db.min_connections > db.max_connections {
        errors.push(format!(
            "database.min_connections ({}) must be <= max_connections ({})",
            db.min_connections, db.max_connections
        ));
    }

    if config.server.max_body_bytes == 0 {
        errors.push("server.max_body_bytes must be > 0".to_string());
    }
    if !config.gemini.base_url.starts_with("http://")
        && !config.gemini.base_url.starts_with("https://")
    {
        errors.push(format!(
            "gemini.base_url = '{}' must be an http(s) URL",
            config.gemini.base_url
        ));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

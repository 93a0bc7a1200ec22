//! Canonical text forms at the vector-store boundary
//!
//! - `encode_vector`: float vector → pgvector literal (`[0.1,-2,0]`)
//! - `decode_text_array`: PostgreSQL `text[]` output (`{a,"b c"}`) → ordered strings
//!
//! Both are pure. NULL handling is the caller's job: a NULL column never
//! reaches `decode_text_array`, so an empty result always means "present but empty".

/// Encode a vector as a pgvector literal.
///
/// Each component is printed with six decimals, then trailing zeros and a
/// trailing point are stripped. Non-finite values and negative zero encode
/// as `0` because the store rejects NaN and infinities.
pub fn encode_vector(values: &[f64]) -> String {
    let mut out = String::with_capacity(values.len() * 10 + 2);
    out.push('[');
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format_component(*v));
    }
    out.push(']');
    out
}

fn format_component(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let formatted = format!("{v:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Decode the text output of a PostgreSQL array into its elements.
///
/// Strips the surrounding braces, splits on `,`, trims quotes and whitespace
/// from each element and drops empty elements. `""` and `"{}"` both decode
/// to an empty list.
pub fn decode_text_array(literal: &str) -> Vec<String> {
    let inner = literal.trim();
    let inner = inner.strip_prefix('{').unwrap_or(inner);
    let inner = inner.strip_suffix('}').unwrap_or(inner);
    if inner.trim().is_empty() {
        return Vec::new();
    }

    inner
        .split(',')
        .map(|p| p.trim_matches(|c: char| c == '"' || c.is_whitespace()))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

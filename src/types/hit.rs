//! Retrieved records and the answer envelope

use serde::Serialize;

/// Returned when the generation capability produces no usable text
pub const FALLBACK_ANSWER: &str = "I couldn't compose an answer from the current context.";

/// One retrieved record, ranked by distance to the query embedding.
///
/// Serialises with the wire names of the `/ask` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    #[serde(rename = "pageid")]
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub realities: Vec<String>,
    pub categories: Vec<String>,
    #[serde(rename = "used_by_doctor_strange")]
    pub flag: bool,
    /// Non-negative; smaller is more relevant
    pub distance: f64,
}

/// A catalog record as listed by `GET /spells` (a `Hit` without a distance)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    #[serde(rename = "pageid")]
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub realities: Vec<String>,
    pub categories: Vec<String>,
    #[serde(rename = "used_by_doctor_strange")]
    pub flag: bool,
}

/// The minimal projection of a `Hit` handed to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroundingBrief<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub summary: &'a str,
    pub realities: &'a [String],
    #[serde(rename = "used_by_doctor_strange")]
    pub flag: bool,
}

impl<'a> From<&'a Hit> for GroundingBrief<'a> {
    fn from(hit: &'a Hit) -> Self {
        Self {
            title: &hit.title,
            url: &hit.url,
            summary: &hit.summary,
            realities: &hit.realities,
            flag: hit.flag,
        }
    }
}

/// Successful pipeline output: `{ "answer": ..., "results": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub answer: String,
    #[serde(rename = "results")]
    pub hits: Vec<Hit>,
}

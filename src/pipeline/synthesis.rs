//! Answer synthesis: grounded prompt → answer text
//!
//! The generator only ever sees the query and a JSON array of
//! [`GroundingBrief`]s built from the retrieved hits, in ranking order.

use crate::llm::{CapabilityError, TextGenerator};
use crate::types::{GroundingBrief, Hit, FALLBACK_ANSWER};
use std::sync::Arc;
use std::time::Duration;

/// Restricts the model to the supplied context
pub const GROUNDING_INSTRUCTION: &str = "You are a precise Marvel wiki assistant. \
Answer using ONLY the provided context. Prefer concise bullets. \
Include spell names as markdown links to their URL when helpful. \
If uncertain, say so briefly.";

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("empty query")]
    EmptyInput,
    #[error("generation capability unavailable: {0}")]
    CapabilityUnavailable(#[from] CapabilityError),
    #[error("could not serialise grounding context: {0}")]
    Context(#[from] serde_json::Error),
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Clone)]
pub struct AnswerSynthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// An empty `hits` slice is still sent to the generator.
    pub async fn synthesize(&self, query: &str, hits: &[Hit]) -> Result<String, SynthesisError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SynthesisError::EmptyInput);
        }

        let prompt = build_prompt(query, hits)?;
        let fragments = self.generator.generate(&prompt).await?;
        Ok(extract_answer(&fragments))
    }
}

/// Instruction, question and context JSON, in that order.
pub fn build_prompt(query: &str, hits: &[Hit]) -> Result<String, serde_json::Error> {
    let briefs: Vec<GroundingBrief<'_>> = hits.iter().map(GroundingBrief::from).collect();
    let context = serde_json::to_string(&briefs)?;
    Ok(format!(
        "{GROUNDING_INSTRUCTION}\n\nUser question: {query}\n\nContext JSON (top matches):\n{context}"
    ))
}

/// Concatenate fragments and trim; never returns an empty string.
pub fn extract_answer(fragments: &[String]) -> String {
    let joined = fragments.concat();
    let answer = joined.trim();
    if answer.is_empty() {
        FALLBACK_ANSWER.to_string()
    } else {
        answer.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: i64, title: &str) -> Hit {
        Hit {
            id,
            title: title.to_string(),
            summary: format!("{title} summary"),
            url: format!("https://wiki/{id}"),
            image_url: Some("https://img".to_string()),
            realities: vec!["Earth-616".to_string()],
            categories: vec!["Secret".to_string()],
            flag: id % 2 == 0,
            distance: 0.123_456,
        }
    }

    #[test]
    fn test_prompt_parts_in_order() {
        let prompt = build_prompt("what opens portals?", &[hit(1, "Sling Ring")]).unwrap();
        let instruction = prompt.find("ONLY the provided context").unwrap();
        let question = prompt.find("User question: what opens portals?").unwrap();
        let context = prompt.find("Context JSON (top matches):").unwrap();
        assert!(instruction < question && question < context);
    }

    #[test]
    fn test_prompt_context_is_minimal_and_ordered() {
        let prompt = build_prompt("q", &[hit(2, "Alpha"), hit(1, "Beta")]).unwrap();
        let json = prompt.rsplit('\n').next().unwrap();
        let briefs: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(briefs[0]["title"], "Alpha");
        assert_eq!(briefs[1]["title"], "Beta");
        assert_eq!(briefs[0]["used_by_doctor_strange"], true);
        for excluded in ["pageid", "distance", "image_url", "categories"] {
            assert!(briefs[0].get(excluded).is_none(), "{excluded} leaked into context");
        }
        assert!(!prompt.contains("Secret"));
    }

    #[test]
    fn test_prompt_with_no_hits_has_empty_context() {
        let prompt = build_prompt("q", &[]).unwrap();
        assert!(prompt.ends_with("Context JSON (top matches):\n[]"));
    }

    #[test]
    fn test_extract_concatenates_and_trims() {
        let fragments = vec!["  Use the ".to_string(), "Sling Ring.\n".to_string()];
        assert_eq!(extract_answer(&fragments), "Use the Sling Ring.");
    }

    #[test]
    fn test_extract_falls_back_on_blank_output() {
        assert_eq!(extract_answer(&[]), FALLBACK_ANSWER);
        assert_eq!(extract_answer(&[" ".to_string(), "\n".to_string()]), FALLBACK_ANSWER);
    }
}

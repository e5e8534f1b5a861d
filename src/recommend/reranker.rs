use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::models::RankedCandidate;
use super::prompt::build_rerank_prompt;
use crate::core::error::{RecommendError, Result};
use crate::llm::gateway::LanguageModelGateway;


/// Second-pass selection: the model picks every relevant candidate and their
/// presentation order.
pub struct AnswerReranker {
    gateway: Arc<dyn LanguageModelGateway>,
}

impl AnswerReranker {

    pub fn new(gateway: Arc<dyn LanguageModelGateway>) -> Self {
        Self { gateway }
    }

    /// Returns the selected candidates in the model's order, each with its
    /// original embedding score.
    pub async fn select(&self, candidates: &[RankedCandidate], message: &str) -> Result<Vec<RankedCandidate>> {
        if candidates.is_empty() {
            debug!("Nothing to rerank");
            return Ok(Vec::new());
        }

        let prompt = build_rerank_prompt(candidates);
        let raw = self.gateway.classify(&prompt, message).await?;

        let indices = parse_indices(&raw, candidates.len()).inspect_err(|e| warn!("{}", e))?;
        info!("Reranker kept {} of {} candidates: {:?}", indices.len(), candidates.len(), indices);

        Ok(indices.into_iter().map(|i| candidates[i].clone()).collect())
    }
}


/// Strict decode of a JSON array of distinct indices in `0..len`.
fn parse_indices(raw: &str, len: usize) -> Result<Vec<usize>> {
    let indices: Vec<usize> = serde_json::from_str(raw.trim())
        .map_err(|e| RecommendError::rerank_parse(raw, format!("not a JSON array of indices: {e}")))?;

    if indices.is_empty() {
        return Err(RecommendError::rerank_parse(raw, "empty selection"));
    }

    let mut seen = HashSet::with_capacity(indices.len());
    for &index in &indices {
        if index >= len {
            return Err(RecommendError::rerank_parse(
                raw,
                format!("index {index} outside 0..={}", len - 1),
            ));
        }
        if !seen.insert(index) {
            return Err(RecommendError::rerank_parse(raw, format!("index {index} repeated")));
        }
    }
    Ok(indices)
}

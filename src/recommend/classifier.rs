use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::prompt::{build_category_prompt, build_entities_prompt};
use crate::core::error::{RecommendError, Result};
use crate::knowledge::models::CategoryVocabulary;
use crate::llm::gateway::LanguageModelGateway;

const NO_MATCH: i64 = -1;


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityClassification {
    pub main_category: Option<String>,
    pub target_audience: Option<String>,
}


/// Maps a message onto the knowledge base's category vocabulary by asking the
/// model for a position in a numbered list.
pub struct CategoryClassifier {
    gateway: Arc<dyn LanguageModelGateway>,
}

impl CategoryClassifier {

    pub fn new(gateway: Arc<dyn LanguageModelGateway>) -> Self {
        Self { gateway }
    }

    /// `Ok(None)` when the model answers `-1`: the message fits no category and
    /// the caller should not filter.
    pub async fn classify_main_category(&self, categories: &[String], message: &str) -> Result<Option<String>> {
        let prompt = build_category_prompt(categories);
        let raw = self.gateway.classify(&prompt, message).await?;

        let index = parse_index(&raw).ok_or_else(|| {
            warn!("Classifier answered with a non-integer: {:?}", crate::preview(&raw, 80));
            RecommendError::classification(raw.as_str())
        })?;

        let category = resolve(index, categories, &raw)?;
        debug!("Main category resolved: {:?}", category);
        Ok(category)
    }

    /// Resolves main category and target audience in one call. Either slot may
    /// be `-1` independently of the other.
    pub async fn classify_entities(
        &self,
        vocabulary: &CategoryVocabulary,
        message: &str,
    ) -> Result<EntityClassification> {
        let prompt = build_entities_prompt(&vocabulary.main_categories, &vocabulary.target_audiences);
        let raw = self.gateway.classify(&prompt, message).await?;

        let [main_index, audience_index]: [i64; 2] = serde_json::from_str(raw.trim()).map_err(|e| {
            warn!("Entity classifier answer is not a pair of integers ({}): {:?}", e, crate::preview(&raw, 80));
            RecommendError::classification(raw.as_str())
        })?;

        let classification = EntityClassification {
            main_category: resolve(main_index, &vocabulary.main_categories, &raw)?,
            target_audience: resolve(audience_index, &vocabulary.target_audiences, &raw)?,
        };
        debug!("Entities resolved: {:?}", classification);
        Ok(classification)
    }
}


/// Exactly one decimal integer with an optional `-`. A leading `+` is rejected.
fn parse_index(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}


fn resolve(index: i64, values: &[String], raw: &str) -> Result<Option<String>> {
    if index == NO_MATCH {
        return Ok(None);
    }
    usize::try_from(index)
        .ok()
        .and_then(|i| values.get(i))
        .cloned()
        .map(Some)
        .ok_or_else(|| {
            warn!("Classifier index {} outside 0..{}", index, values.len());
            RecommendError::classification(raw)
        })
}

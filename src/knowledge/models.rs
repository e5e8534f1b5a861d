use serde::{Deserialize, Serialize};

use crate::core::error::{RecommendError, Result};


/// One canonical FAQ record.
///
/// `embedding` holds the vector of `example_question` as JSON text, the way the
/// knowledge store persists it. `None` (or a blank string) means it has not been
/// computed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub main_category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub example_question: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    pub template_answer: String,
    #[serde(default)]
    pub embedding: Option<String>,
}

impl KnowledgeEntry {

    pub fn new(
        main_category: impl Into<String>,
        example_question: impl Into<String>,
        template_answer: impl Into<String>,
    ) -> Self {
        Self {
            main_category: main_category.into(),
            sub_category: None,
            example_question: example_question.into(),
            priority: None,
            target_audience: None,
            template_answer: template_answer.into(),
            embedding: None,
        }
    }


    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }


    pub fn with_target_audience(mut self, target_audience: impl Into<String>) -> Self {
        self.target_audience = Some(target_audience.into());
        self
    }


    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }


    pub fn with_embedding(mut self, embedding: &[f32]) -> Result<Self> {
        self.embedding = Some(encode_embedding(embedding)?);
        Ok(self)
    }


    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("main_category", &self.main_category),
            ("example_question", &self.example_question),
            ("template_answer", &self.template_answer),
        ] {
            if value.trim().is_empty() {
                return Err(RecommendError::InvalidInput(format!(
                    "knowledge entry field '{field}' must not be empty"
                )));
            }
        }
        Ok(())
    }


    pub fn has_embedding(&self) -> bool {
        self.embedding.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    /// `Ok(None)` when no embedding is stored yet; `MalformedEmbedding` when one
    /// is stored but is not a non-empty array of numbers.
    pub fn decode_embedding(&self) -> Result<Option<Vec<f32>>> {
        match self.embedding.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => decode_embedding(raw)
                .map(Some)
                .map_err(|reason| RecommendError::malformed_embedding(&self.example_question, reason)),
        }
    }
}


pub fn encode_embedding(embedding: &[f32]) -> Result<String> {
    if embedding.is_empty() {
        return Err(RecommendError::InvalidInput("embedding vector is empty".into()));
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(RecommendError::InvalidInput("embedding contains non-finite values".into()));
    }
    serde_json::to_string(embedding).map_err(|e| RecommendError::InvalidInput(e.to_string()))
}

fn decode_embedding(raw: &str) -> std::result::Result<Vec<f32>, String> {
    let vector: Vec<f32> = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if vector.is_empty() {
        return Err("embedding array is empty".to_string());
    }
    Ok(vector)
}


/// Distinct category values present in the knowledge base, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryVocabulary {
    pub main_categories: Vec<String>,
    pub target_audiences: Vec<String>,
}

impl CategoryVocabulary {

    pub fn from_entries(entries: &[KnowledgeEntry]) -> Self {
        let mut vocabulary = Self::default();
        for entry in entries {
            push_distinct(&mut vocabulary.main_categories, &entry.main_category);
            if let Some(audience) = &entry.target_audience {
                push_distinct(&mut vocabulary.target_audiences, audience);
            }
        }
        vocabulary
    }
}

fn push_distinct(values: &mut Vec<String>, candidate: &str) {
    let candidate = candidate.trim();
    if !candidate.is_empty() && !values.iter().any(|v| v == candidate) {
        values.push(candidate.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_text_roundtrip() {
        let entry = KnowledgeEntry::new("Карты", "Как заблокировать карту?", "Позвоните на горячую линию.")
            .with_embedding(&[0.25, -0.5, 1.0])
            .unwrap();
        assert!(entry.has_embedding());
        assert_eq!(entry.decode_embedding().unwrap(), Some(vec![0.25, -0.5, 1.0]));
    }

    #[test]
    fn test_missing_embedding_is_none() {
        let mut entry = KnowledgeEntry::new("Карты", "q", "a");
        assert_eq!(entry.decode_embedding().unwrap(), None);

        entry.embedding = Some("  ".to_string());
        assert!(!entry.has_embedding());
        assert_eq!(entry.decode_embedding().unwrap(), None);
    }

    #[test]
    fn test_corrupt_embedding_names_the_question() {
        let mut entry = KnowledgeEntry::new("Вклады", "Какая ставка по вкладу?", "a");
        entry.embedding = Some("[0.1, oops]".to_string());

        match entry.decode_embedding() {
            Err(RecommendError::MalformedEmbedding { question, .. }) => {
                assert_eq!(question, "Какая ставка по вкладу?")
            }
            other => panic!("expected MalformedEmbedding, got {other:?}"),
        }

        entry.embedding = Some("[]".to_string());
        assert!(matches!(entry.decode_embedding(), Err(RecommendError::MalformedEmbedding { .. })));
    }

    #[test]
    fn test_encode_rejects_nan() {
        assert!(encode_embedding(&[f32::NAN, 1.0]).is_err());
        assert!(encode_embedding(&[]).is_err());
    }

    #[test]
    fn test_validate_requires_text_fields() {
        assert!(KnowledgeEntry::new("Карты", "q", "a").validate().is_ok());
        assert!(KnowledgeEntry::new(" ", "q", "a").validate().is_err());
        assert!(KnowledgeEntry::new("Карты", "q", "").validate().is_err());
    }

    #[test]
    fn test_vocabulary_distinct_in_first_seen_order() {
        let entries = vec![
            KnowledgeEntry::new("Новые клиенты", "q1", "a1").with_target_audience("Физические лица"),
            KnowledgeEntry::new("Карты", "q2", "a2"),
            KnowledgeEntry::new("Новые клиенты", "q3", "a3").with_target_audience("Бизнес"),
            KnowledgeEntry::new("Карты", "q4", "a4").with_target_audience("Физические лица"),
        ];
        let vocabulary = CategoryVocabulary::from_entries(&entries);
        assert_eq!(vocabulary.main_categories, vec!["Новые клиенты", "Карты"]);
        assert_eq!(vocabulary.target_audiences, vec!["Физические лица", "Бизнес"]);
    }

    #[test]
    fn test_entry_json_without_optional_fields() {
        let entry: KnowledgeEntry = serde_json::from_str(
            r#"{"main_category": "Кредиты", "example_question": "q", "template_answer": "a"}"#,
        )
        .unwrap();
        assert!(entry.sub_category.is_none());
        assert!(!entry.has_embedding());
    }
}

use serde::{Deserialize, Serialize};

use crate::knowledge::models::KnowledgeEntry;


/// A knowledge-base answer scored against one message. Also what the reranker
/// hands back after selecting a subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    pub answer_text: String,
    /// `round(cosine * 100)`, clamped to `0..=100`.
    pub score: u8,
    pub source_category: Option<String>,
    pub sub_category: Option<String>,
    pub target_audience: Option<String>,
    pub priority: Option<String>,
}

impl RankedCandidate {

    pub fn from_entry(entry: &KnowledgeEntry, score: u8) -> Self {
        Self {
            answer_text: entry.template_answer.clone(),
            score,
            source_category: Some(entry.main_category.clone()),
            sub_category: entry.sub_category.clone(),
            target_audience: entry.target_audience.clone(),
            priority: entry.priority.clone(),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub answer: String,
    pub score: u8,
    pub main_category: String,
    pub sub_category: Option<String>,
    pub target_audience: Option<String>,
    /// Operator-facing priority label of the source entry, if it has one.
    pub priority: Option<String>,
}

impl Recommendation {
    /// Keeps the source entry's attributes, labelled with `main_category`.
    pub fn tagged(candidate: RankedCandidate, main_category: &str) -> Self {
        Self {
            answer: candidate.answer_text,
            score: candidate.score,
            main_category: main_category.to_string(),
            sub_category: candidate.sub_category,
            target_audience: candidate.target_audience,
            priority: candidate.priority,
        }
    }

    /// Embedding-only result with no category information.
    pub fn untagged(candidate: RankedCandidate) -> Self {
        Self {
            answer: candidate.answer_text,
            score: candidate.score,
            main_category: String::new(),
            sub_category: None,
            target_audience: None,
            priority: candidate.priority,
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use strum::{AsRefStr, Display};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::classifier::CategoryClassifier;
use super::models::Recommendation;
use super::ranker::rate_by_embedding;
use super::reranker::AnswerReranker;
use super::trust::partition;
use super::DEFAULT_TRUST_THRESHOLD;
use crate::core::error::{RecommendError, Result};
use crate::knowledge::models::CategoryVocabulary;
use crate::knowledge::store::EmbeddingStore;
use crate::llm::gateway::LanguageModelGateway;


/// Stages a `recommend` request moves through; recorded on every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum PipelineStage {
    Embedding,
    Classifying,
    TrustCheck,
    ScopedRescore,
    Reranking,
    Done,
    Failed,
}


pub struct RecommendationPipeline {
    store: Arc<dyn EmbeddingStore>,
    gateway: Arc<dyn LanguageModelGateway>,
    classifier: CategoryClassifier,
    reranker: AnswerReranker,
    trust_threshold: u8,
}

impl RecommendationPipeline {

    pub fn new(store: Arc<dyn EmbeddingStore>, gateway: Arc<dyn LanguageModelGateway>) -> Self {
        Self {
            classifier: CategoryClassifier::new(gateway.clone()),
            reranker: AnswerReranker::new(gateway.clone()),
            store,
            gateway,
            trust_threshold: DEFAULT_TRUST_THRESHOLD,
        }
    }


    pub fn with_trust_threshold(mut self, trust_threshold: u8) -> Self {
        self.trust_threshold = trust_threshold.min(100);
        self
    }


    pub fn trust_threshold(&self) -> u8 {
        self.trust_threshold
    }


    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    /// Full pipeline: embedding and classification in parallel, trusted
    /// embedding matches returned as-is, otherwise category-scoped reranking.
    pub async fn recommend(&self, message: &str) -> Result<Vec<Recommendation>> {
        let span = info_span!("recommend", request_id = %Uuid::new_v4());
        self.run_full(message)
            .instrument(span)
            .await
            .inspect_err(|e| warn!(stage = %PipelineStage::Failed, "Recommendation failed: {}", e))
    }

    /// Embedding similarity only; no classification, no reranking.
    pub async fn recommend_fast(&self, message: &str) -> Result<Vec<Recommendation>> {
        let span = info_span!("recommend_fast", request_id = %Uuid::new_v4());
        self.run_fast(message)
            .instrument(span)
            .await
            .inspect_err(|e| warn!(stage = %PipelineStage::Failed, "Fast recommendation failed: {}", e))
    }

    /// [`Self::recommend`] under a deadline. In-flight model calls are dropped
    /// when it expires.
    pub async fn recommend_within(&self, message: &str, limit: Duration) -> Result<Vec<Recommendation>> {
        tokio::time::timeout(limit, self.recommend(message))
            .await
            .map_err(|_| RecommendError::Timeout(limit))?
    }


    pub async fn recommend_fast_within(&self, message: &str, limit: Duration) -> Result<Vec<Recommendation>> {
        tokio::time::timeout(limit, self.recommend_fast(message))
            .await
            .map_err(|_| RecommendError::Timeout(limit))?
    }

    async fn run_full(&self, message: &str) -> Result<Vec<Recommendation>> {
        ensure_message(message)?;
        info!("Recommending for: {}", crate::preview(message, crate::LOG_PREVIEW_CHARS));

        let entries = self.store.entries().await?;
        let vocabulary = CategoryVocabulary::from_entries(&entries);

        debug!(
            stage = %PipelineStage::Embedding,
            parallel = %PipelineStage::Classifying,
            "Embedding message and classifying over {} categories",
            vocabulary.main_categories.len()
        );
        let (embedding, category) = tokio::join!(
            self.embed_message(message),
            self.classify(&vocabulary, message)
        );
        let embedding = embedding?;
        let category = category?;

        let ranked = rate_by_embedding(&entries, &embedding)?;
        let (trusted, remainder) = partition(ranked, self.trust_threshold);
        debug!(
            stage = %PipelineStage::TrustCheck,
            "trusted={}, below threshold={}, category={:?}",
            trusted.len(),
            remainder.len(),
            category
        );

        if !trusted.is_empty() {
            let tag = category.as_deref().unwrap_or_default();
            info!(stage = %PipelineStage::Done, "Returning {} trusted matches", trusted.len());
            return Ok(trusted.into_iter().map(|c| Recommendation::tagged(c, tag)).collect());
        }

        let category = category.ok_or(RecommendError::NoCategory)?;

        let scoped = self.store.entries_in_category(&category).await?;
        let candidates = rate_by_embedding(&scoped, &embedding)?;
        debug!(
            stage = %PipelineStage::ScopedRescore,
            "{} of {} entries in '{}' -> {} candidates",
            scoped.len(),
            entries.len(),
            category,
            candidates.len()
        );

        debug!(stage = %PipelineStage::Reranking, "Reranking {} candidates", candidates.len());
        let selected = self.reranker.select(&candidates, message).await?;

        info!(stage = %PipelineStage::Done, "Returning {} reranked answers", selected.len());
        Ok(selected
            .into_iter()
            .map(|c| Recommendation::tagged(c, &category))
            .collect())
    }

    async fn run_fast(&self, message: &str) -> Result<Vec<Recommendation>> {
        ensure_message(message)?;

        let entries = self.store.entries().await?;
        let embedding = self.embed_message(message).await?;
        let ranked = rate_by_embedding(&entries, &embedding)?;

        info!(
            "Fast path for '{}': {} answers",
            crate::preview(message, crate::LOG_PREVIEW_CHARS),
            ranked.len()
        );
        Ok(ranked.into_iter().map(Recommendation::untagged).collect())
    }

    async fn embed_message(&self, message: &str) -> Result<Vec<f32>> {
        let embedding = self.gateway.embed(message).await?;
        if embedding.is_empty() {
            return Err(RecommendError::EmbeddingUnavailable("gateway returned an empty vector".into()));
        }
        Ok(embedding)
    }

    async fn classify(&self, vocabulary: &CategoryVocabulary, message: &str) -> Result<Option<String>> {
        if vocabulary.main_categories.is_empty() {
            return Ok(None);
        }
        self.classifier
            .classify_main_category(&vocabulary.main_categories, message)
            .await
    }
}


fn ensure_message(message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(RecommendError::InvalidInput("message must not be empty".into()));
    }
    Ok(())
}

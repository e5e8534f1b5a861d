use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use super::models::{encode_embedding, KnowledgeEntry};
use super::store::{EmbeddingStore, KnowledgeSink};
use crate::core::error::{RecommendError, Result};
use crate::llm::gateway::LanguageModelGateway;


#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillReport {
    /// Entries that received an embedding.
    pub embedded: usize,
    /// Questions whose embedding request failed; they stay unembedded.
    pub failed: Vec<String>,
}


/// Maintenance operations on the knowledge base. Never used on the request path.
pub struct KnowledgeIngestor<S: KnowledgeSink> {
    store: Arc<S>,
    gateway: Arc<dyn LanguageModelGateway>,
    concurrency: usize,
}

impl<S: KnowledgeSink> KnowledgeIngestor<S> {

    pub fn new(store: Arc<S>, gateway: Arc<dyn LanguageModelGateway>) -> Self {
        Self {
            store,
            gateway,
            concurrency: 4,
        }
    }


    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Embeds the example question of every entry that has no embedding yet.
    pub async fn backfill_embeddings(&self) -> Result<BackfillReport> {
        let entries = self.store.entries().await?;

        let mut seen = HashSet::new();
        let pending: Vec<String> = entries
            .into_iter()
            .filter(|e| !e.has_embedding())
            .map(|e| e.example_question)
            .filter(|q| seen.insert(q.clone()))
            .collect();

        if pending.is_empty() {
            return Ok(BackfillReport::default());
        }
        info!("Backfilling embeddings for {} questions", pending.len());

        let gateway = &self.gateway;
        let results: Vec<(String, Result<Vec<f32>>)> = stream::iter(pending)
            .map(|question| async move {
                let embedding = gateway.embed(&question).await;
                (question, embedding)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = BackfillReport::default();
        for (question, outcome) in results {
            match outcome.and_then(|v| encode_embedding(&v)) {
                Ok(encoded) => {
                    report.embedded += self.store.attach_embedding(&question, encoded).await?;
                }
                Err(e) => {
                    warn!("Backfill failed for '{}': {}", crate::preview(&question, crate::LOG_PREVIEW_CHARS), e);
                    report.failed.push(question);
                }
            }
        }

        info!(
            "Backfill finished: embedded={}, failed={}",
            report.embedded,
            report.failed.len()
        );
        Ok(report)
    }

    /// Stores an operator's reply as a new entry unless the knowledge base
    /// already covers the message or the reply. Returns whether an entry was added.
    pub async fn learn_from_dialogue(
        &self,
        operator_reply: &str,
        customer_message: &str,
        main_category: &str,
    ) -> Result<bool> {
        if operator_reply.trim().is_empty() || customer_message.trim().is_empty() {
            return Err(RecommendError::InvalidInput(
                "operator reply and customer message must not be empty".into(),
            ));
        }

        let known = self.store.entries().await?.iter().any(|e| {
            e.example_question.contains(customer_message) || e.template_answer.contains(operator_reply)
        });
        if known {
            return Ok(false);
        }

        let embedding = self.gateway.embed(customer_message).await?;
        let entry = KnowledgeEntry::new(main_category, customer_message, operator_reply)
            .with_embedding(&embedding)?;
        self.store.insert(entry).await?;

        info!(
            "Learned new entry in '{}': {}",
            main_category,
            crate::preview(customer_message, crate::LOG_PREVIEW_CHARS)
        );
        Ok(true)
    }
}



use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::embeddings::EmbeddingGenerator;
use super::providers::base::LlmProvider;
use crate::core::error::{RecommendError, Result};


/// The two model capabilities the recommendation core relies on.
///
/// Implementations return the model's raw text from `classify`; validating its
/// shape is the caller's job.
#[async_trait]
pub trait LanguageModelGateway: Send + Sync {
    /// Fails with [`RecommendError::EmbeddingUnavailable`].
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Fails with [`RecommendError::Gateway`] on transport problems only.
    async fn classify(&self, system_prompt: &str, user_text: &str) -> Result<String>;
}


pub struct HttpGateway {
    chat: Arc<dyn LlmProvider>,
    embedder: EmbeddingGenerator,
}

impl HttpGateway {

    pub fn new(chat: Arc<dyn LlmProvider>, embedder: EmbeddingGenerator) -> Self {
        Self { chat, embedder }
    }
}

#[async_trait]
impl LanguageModelGateway for HttpGateway {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.generate(text).await.map_err(|e| {
            warn!("Embedding via {} failed: {}", self.embedder.model(), e);
            RecommendError::EmbeddingUnavailable(e.to_string())
        })
    }

    async fn classify(&self, system_prompt: &str, user_text: &str) -> Result<String> {
        let (content, metadata) = self
            .chat
            .generate(system_prompt, user_text)
            .await
            .map_err(|e| {
                warn!("Chat call to {} failed: {}", self.chat.provider_name(), e);
                RecommendError::Gateway(e.to_string())
            })?;

        debug!(
            "{}/{} answered {:?} (prompt={:?}, completion={:?}, total={:?} tokens)",
            metadata.provider,
            metadata.model,
            crate::preview(&content, 80),
            metadata.tokens_prompt,
            metadata.tokens_completion,
            metadata.tokens_total
        );
        Ok(content)
    }
}

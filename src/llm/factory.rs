

use std::sync::Arc;

use super::embeddings::EmbeddingGenerator;
use super::gateway::HttpGateway;
use super::providers::base::LlmProvider;
use super::providers::openai::{OpenAiCompatProvider, SamplingParams};
use crate::core::config::AdvisorConfig;
use crate::core::error::{RecommendError, Result};


pub struct GatewayFactory;

impl GatewayFactory {

    pub fn chat_provider(config: &AdvisorConfig) -> Result<Arc<dyn LlmProvider>> {
        let provider = OpenAiCompatProvider::new(
            config.llm_base_url.clone(),
            config.llm_api_key.clone(),
            config.llm_model.clone(),
            SamplingParams {
                temperature: config.llm_temperature,
                top_p: config.llm_top_p,
                max_tokens: config.llm_max_tokens,
            },
            config.http_timeout(),
        )
        .map_err(|e| RecommendError::Config(format!("chat client: {e}")))?;
        Ok(Arc::new(provider))
    }


    pub fn embedder(config: &AdvisorConfig) -> Result<EmbeddingGenerator> {
        EmbeddingGenerator::new(
            config.embedding_base_url.clone(),
            config.embedding_model.clone(),
            config.embedding_key().map(str::to_string),
            config.http_timeout(),
        )
        .map_err(|e| RecommendError::Config(format!("embedding client: {e}")))
    }


    pub fn from_config(config: &AdvisorConfig) -> Result<HttpGateway> {
        Ok(HttpGateway::new(Self::chat_provider(config)?, Self::embedder(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_provider_uses_configured_model() {
        let config = AdvisorConfig {
            llm_model: "mistral-small-latest".to_string(),
            llm_base_url: "https://api.mistral.ai/v1".to_string(),
            ..Default::default()
        };
        let provider = GatewayFactory::chat_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "mistral-small-latest");
        assert_eq!(provider.provider_name(), "api.mistral.ai");
    }

    #[test]
    fn test_embedder_uses_configured_model() {
        let embedder = GatewayFactory::embedder(&AdvisorConfig::default()).unwrap();
        assert_eq!(embedder.model(), "bge-m3");
    }
}

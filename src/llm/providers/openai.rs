

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::{LlmMetadata, LlmProvider, LlmProviderError};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}


#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
            max_tokens: 1000,
        }
    }
}


/// Chat-completions client for any OpenAI-compatible endpoint (SciBox, Mistral, vLLM...).
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: Option<String>,
    model: String,
    sampling: SamplingParams,
    client: Client,
}

impl OpenAiCompatProvider {

    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        sampling: SamplingParams,
        timeout: Duration,
    ) -> Result<Self, LlmProviderError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        let name = url::Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "openai-compatible".to_string());

        let client = Client::builder().timeout(timeout).build()?;

        info!("Chat provider initialized (host={}, model={})", name, model);
        Ok(Self {
            name,
            base_url,
            api_key,
            model,
            sampling,
            client,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(system_prompt.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(user_prompt.to_string()),
                },
            ],
            temperature: self.sampling.temperature,
            top_p: self.sampling.top_p,
            max_tokens: self.sampling.max_tokens,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await?
            .error_for_status()
            .map_err(LlmProviderError::Http)?
            .json::<ChatResponse>()
            .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmProviderError::Provider("No choices in response".to_string()))?
            .message
            .content
            .ok_or_else(|| LlmProviderError::Provider("No answers found".to_string()))?;

        let mut metadata = LlmMetadata {
            provider: self.name.clone(),
            model: self.model.clone(),
            ..Default::default()
        };

        if let Some(usage) = response.usage {
            metadata.tokens_prompt = Some(usage.prompt_tokens);
            metadata.tokens_completion = Some(usage.completion_tokens);
            metadata.tokens_total = Some(usage.total_tokens);
        }

        debug!(
            "Completion received: model={}, tokens={:?}",
            metadata.model, metadata.tokens_total
        );

        Ok((content, metadata))
    }

    fn provider_name(&self) -> &str {
        &self.name
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name_from_host() {
        let provider = OpenAiCompatProvider::new(
            "https://llm.t1v.scibox.tech/v1/",
            Some("sk-test".to_string()),
            "Qwen2.5-72B-Instruct-AWQ",
            SamplingParams::default(),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(provider.provider_name(), "llm.t1v.scibox.tech");
        assert_eq!(provider.model_name(), "Qwen2.5-72B-Instruct-AWQ");
        assert_eq!(provider.base_url, "https://llm.t1v.scibox.tech/v1");
    }

    #[test]
    fn test_chat_response_with_usage() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "2"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 1, "total_tokens": 121}
        }"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("2"));
        assert_eq!(response.usage.unwrap().total_tokens, 121);
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: Some("s".to_string()),
            }],
            temperature: 0.0,
            top_p: 1.0,
            max_tokens: 1000,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["max_tokens"], 1000);
    }
}

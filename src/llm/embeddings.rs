

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};


#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty text")]
    EmptyText,
}


#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}


/// Client for an OpenAI-compatible `/embeddings` endpoint.
pub struct EmbeddingGenerator {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingGenerator {

    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();

        info!("EmbeddingGenerator initialized: url={}, model={}", base_url, model);

        Ok(Self {
            base_url,
            model,
            api_key,
            client: Client::builder().timeout(timeout).build()?,
        })
    }


    pub async fn generate(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await?
            .error_for_status()
            .map_err(EmbeddingError::Http)?
            .json::<EmbeddingResponse>()
            .await?;

        let embedding = extract_first(response)?;
        debug!(
            "Embedded '{}' (dims={})",
            crate::preview(text, crate::LOG_PREVIEW_CHARS),
            embedding.len()
        );
        Ok(embedding)
    }


    pub fn model(&self) -> &str {
        &self.model
    }
}

fn extract_first(response: EmbeddingResponse) -> Result<Vec<f32>, EmbeddingError> {
    let embedding = response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding in response".to_string()))?;

    if embedding.is_empty() {
        return Err(EmbeddingError::InvalidResponse("Embedding vector is empty".to_string()));
    }
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_embedding() {
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{"data": [{"embedding": [0.1, 0.2, 0.3]}, {"embedding": [9.0]}]}"#)
                .unwrap();
        assert_eq!(extract_first(response).unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_extract_rejects_missing_or_empty() {
        let none: EmbeddingResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(matches!(extract_first(none), Err(EmbeddingError::InvalidResponse(_))));

        let empty: EmbeddingResponse = serde_json::from_str(r#"{"data": [{"embedding": []}]}"#).unwrap();
        assert!(matches!(extract_first(empty), Err(EmbeddingError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_text() {
        let generator =
            EmbeddingGenerator::new("http://localhost:9", "bge-m3", None, Duration::from_secs(1)).unwrap();
        assert!(matches!(generator.generate("   ").await, Err(EmbeddingError::EmptyText)));
    }
}

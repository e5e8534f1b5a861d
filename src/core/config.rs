use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{RecommendError, Result};
use crate::recommend::DEFAULT_TRUST_THRESHOLD;


pub const ENV_PREFIX: &str = "FAQ_ADVISOR";


pub const CONFIG_PATH_ENV: &str = "FAQ_ADVISOR_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "faq-advisor";


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {

    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_temperature: f64,
    pub llm_top_p: f64,
    pub llm_max_tokens: u32,


    pub embedding_base_url: String,
    pub embedding_model: String,
    /// Falls back to `llm_api_key` when unset.
    pub embedding_api_key: Option<String>,


    pub http_timeout_secs: u64,
    /// Whole-request deadline applied by the MCP surface; `0` disables it.
    pub request_timeout_secs: u64,


    pub trust_threshold: u8,


    pub knowledge_base_path: Option<PathBuf>,
    pub backfill_on_start: bool,
    pub backfill_concurrency: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            llm_base_url: crate::DEFAULT_API_BASE_URL.to_string(),
            llm_model: crate::DEFAULT_LLM_MODEL.to_string(),
            llm_api_key: None,
            llm_temperature: 0.0,
            llm_top_p: 1.0,
            llm_max_tokens: 1000,

            embedding_base_url: crate::DEFAULT_API_BASE_URL.to_string(),
            embedding_model: crate::DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_api_key: None,

            http_timeout_secs: 30,
            request_timeout_secs: 60,

            trust_threshold: DEFAULT_TRUST_THRESHOLD,

            knowledge_base_path: None,
            backfill_on_start: true,
            backfill_concurrency: 4,
        }
    }
}

impl AdvisorConfig {
    /// Loads defaults, then the optional config file, then `FAQ_ADVISOR_*` variables.
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let loaded: Self = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }


    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("llm_base_url", &self.llm_base_url),
            ("embedding_base_url", &self.embedding_base_url),
        ] {
            Url::parse(value)
                .map_err(|e| RecommendError::Config(format!("{name} '{value}' is not a URL: {e}")))?;
        }

        if self.trust_threshold > 100 {
            return Err(RecommendError::Config(format!(
                "trust_threshold must be within 0..=100, got {}",
                self.trust_threshold
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(RecommendError::Config("http_timeout_secs must be positive".into()));
        }
        if self.backfill_concurrency == 0 {
            return Err(RecommendError::Config("backfill_concurrency must be positive".into()));
        }
        Ok(())
    }


    pub fn embedding_key(&self) -> Option<&str> {
        self.embedding_api_key
            .as_deref()
            .or(self.llm_api_key.as_deref())
    }


    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }


    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scibox_deployment() {
        let config = AdvisorConfig::default();
        assert_eq!(config.llm_model, "Qwen2.5-72B-Instruct-AWQ");
        assert_eq!(config.embedding_model, "bge-m3");
        assert_eq!(config.trust_threshold, 85);
        assert_eq!(config.llm_max_tokens, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = AdvisorConfig {
            llm_base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(RecommendError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_threshold_above_100() {
        let config = AdvisorConfig {
            trust_threshold: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_embedding_key_falls_back_to_llm_key() {
        let mut config = AdvisorConfig {
            llm_api_key: Some("sk-llm".to_string()),
            ..Default::default()
        };
        assert_eq!(config.embedding_key(), Some("sk-llm"));

        config.embedding_api_key = Some("sk-embed".to_string());
        assert_eq!(config.embedding_key(), Some("sk-embed"));
    }

    #[test]
    fn test_request_timeout_zero_disables() {
        let config = AdvisorConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: AdvisorConfig =
            serde_json::from_str(r#"{"llm_model": "mistral-small-latest", "trust_threshold": 90}"#).unwrap();
        assert_eq!(config.llm_model, "mistral-small-latest");
        assert_eq!(config.trust_threshold, 90);
        assert_eq!(config.embedding_model, "bge-m3");
    }
}

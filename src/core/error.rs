use thiserror::Error;


#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Malformed embedding for entry '{question}': {reason}")]
    MalformedEmbedding { question: String, reason: String },

    #[error("Classification failed, model answered: {raw:?}")]
    Classification { raw: String },

    #[error("Rerank response rejected ({reason}), model answered: {raw:?}")]
    RerankParse { raw: String, reason: String },

    #[error("No trusted candidates and no category to scope reranking")]
    NoCategory,

    #[error("LLM gateway error: {0}")]
    Gateway(String),

    #[error("Knowledge store error: {0}")]
    Store(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RecommendError {
    pub fn classification(raw: impl Into<String>) -> Self {
        Self::Classification { raw: raw.into() }
    }

    pub fn rerank_parse(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RerankParse {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_embedding(question: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedEmbedding {
            question: question.into(),
            reason: reason.into(),
        }
    }

    /// Failures caused by bad caller input rather than by a collaborator or the model.
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<config::ConfigError> for RecommendError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}


pub type Result<T> = std::result::Result<T, RecommendError>;

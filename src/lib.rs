
pub mod core;
pub mod knowledge;
pub mod llm;
pub mod mcp;
pub mod recommend;
pub mod utils;

pub use utils::preview;


pub use crate::core::config::AdvisorConfig;
pub use crate::core::error::{RecommendError, Result};
pub use knowledge::{CategoryVocabulary, EmbeddingStore, InMemoryKnowledgeBase, KnowledgeEntry, KnowledgeIngestor};
pub use llm::gateway::{HttpGateway, LanguageModelGateway};
pub use recommend::{Recommendation, RecommendationPipeline};


pub const DEFAULT_API_BASE_URL: &str = "https://llm.t1v.scibox.tech/v1";


pub const DEFAULT_LLM_MODEL: &str = "Qwen2.5-72B-Instruct-AWQ";


pub const DEFAULT_EMBEDDING_MODEL: &str = "bge-m3";


pub const LOG_PREVIEW_CHARS: usize = 50;

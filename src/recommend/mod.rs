//! Retrieval-and-rerank core: cosine scoring, LLM category classification,
//! the trust gate and LLM reranking, orchestrated by [`RecommendationPipeline`].

pub mod classifier;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod ranker;
pub mod reranker;
pub mod trust;
pub mod vector;

pub use classifier::{CategoryClassifier, EntityClassification};
pub use models::{RankedCandidate, Recommendation};
pub use pipeline::{PipelineStage, RecommendationPipeline};
pub use ranker::rate_by_embedding;
pub use reranker::AnswerReranker;
pub use trust::partition;
pub use vector::cosine_similarity;


/// Upper bound on candidates kept after ranking.
pub const MAX_CANDIDATES: usize = 10;


/// Minimum score at which an embedding match is returned without reranking.
pub const DEFAULT_TRUST_THRESHOLD: u8 = 85;

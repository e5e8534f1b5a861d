//! Knowledge base of FAQ entries: the record type, the store contract the
//! recommendation core reads through, and maintenance (embedding backfill,
//! learning from operator replies).

pub mod ingest;
pub mod models;
pub mod store;

pub use ingest::{BackfillReport, KnowledgeIngestor};
pub use models::{encode_embedding, CategoryVocabulary, KnowledgeEntry};
pub use store::{EmbeddingStore, InMemoryKnowledgeBase, KnowledgeSink};

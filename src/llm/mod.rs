

pub mod embeddings;
pub mod factory;
pub mod gateway;
pub mod providers;

#[cfg(test)]
pub(crate) mod mock;

pub use embeddings::{EmbeddingError, EmbeddingGenerator};
pub use factory::GatewayFactory;
pub use gateway::{HttpGateway, LanguageModelGateway};

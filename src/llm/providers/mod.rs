

pub mod base;
pub mod openai;

pub use base::{LlmMetadata, LlmProvider, LlmProviderError};
pub use openai::{OpenAiCompatProvider, SamplingParams};

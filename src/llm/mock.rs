//! Scripted gateway for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::gateway::LanguageModelGateway;
use crate::core::error::{RecommendError, Result};


#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Down,
}


/// Embeds every text to a fixed vector unless overridden per text, and answers
/// `classify` calls from a FIFO queue of replies.
#[derive(Default)]
pub struct ScriptedGateway {
    default_embedding: Option<Vec<f32>>,
    embeddings: HashMap<String, Vec<f32>>,
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    embed_calls: AtomicUsize,
    classify_calls: AtomicUsize,
}

impl ScriptedGateway {

    pub fn new(default_embedding: Option<Vec<f32>>) -> Self {
        Self {
            default_embedding,
            ..Default::default()
        }
    }


    pub fn with_embedding(mut self, text: &str, embedding: Vec<f32>) -> Self {
        self.embeddings.insert(text.to_string(), embedding);
        self
    }


    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().push_back(Reply::Text(text.to_string()));
        self
    }


    pub fn reply_down(self) -> Self {
        self.replies.lock().push_back(Reply::Down);
        self
    }


    pub fn classify_calls(&self) -> usize {
        self.classify_calls.load(Ordering::SeqCst)
    }


    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }


    pub fn system_prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LanguageModelGateway for ScriptedGateway {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        self.embeddings
            .get(text)
            .or(self.default_embedding.as_ref())
            .cloned()
            .ok_or_else(|| RecommendError::EmbeddingUnavailable(format!("no embedding scripted for {text:?}")))
    }

    async fn classify(&self, system_prompt: &str, _user_text: &str) -> Result<String> {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(system_prompt.to_string());

        match self.replies.lock().pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Down) => Err(RecommendError::Gateway("connection refused".to_string())),
            None => Err(RecommendError::Gateway("no scripted reply left".to_string())),
        }
    }
}


/// Unit vector in 2D whose cosine with `[1, 0]` equals `similarity`.
pub fn at_similarity(similarity: f32) -> Vec<f32> {
    vec![similarity, (1.0 - similarity * similarity).max(0.0).sqrt()]
}

//! Embeddings for the translation index.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::{Result, SubtransError};
use async_trait::async_trait;

/// Turns text into vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed several texts; the output lines up with the input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SubtransError::Embedding("Empty embedding response".to_string()))
    }

    /// Vector length produced by this embedder.
    fn dimensions(&self) -> usize;
}

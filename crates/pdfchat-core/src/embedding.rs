//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Turns text into dense vectors for similarity search
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single piece of text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Name of the embedding model
    fn model_id(&self) -> &str;
}

//! Offline embedder built from hashed word features

use async_trait::async_trait;

use pdfchat_core::{Embedder, Result};

/// Deterministic embedder that needs no model runtime.
///
/// Unigrams land in three buckets each, weighted by position; bigrams add one
/// more feature. Bucket indices derive from md5 and are stable across builds.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn bucket_hash(token: &str) -> u64 {
        let digest = md5::compute(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.0[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Embed synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let normalized = text.to_lowercase();
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let dim = self.dimension as u64;

        let mut embedding = vec![0.0f32; self.dimension];

        for (pos, word) in words.iter().enumerate() {
            let hash = Self::bucket_hash(word);
            let weight = 1.0 / (pos as f32 + 1.0);

            embedding[(hash % dim) as usize] += weight;
            embedding[((hash >> 16) % dim) as usize] += weight * 0.7;
            embedding[((hash >> 32) % dim) as usize] += weight * 0.5;
        }

        for pair in words.windows(2) {
            let hash = Self::bucket_hash(&format!("{} {}", pair[0], pair[1]));
            embedding[(hash % dim) as usize] += 0.8;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in embedding.iter_mut() {
                *value /= magnitude;
            }
        }

        embedding
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_id(&self) -> &str {
        "hash-384"
    }
}

//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Configuration for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "llama3".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            timeout: Duration::from_secs(3600),
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
}

/// Trait for LLM providers
///
/// Implementations talk to a model runtime and turn a fully assembled prompt
/// into an answer, either in one piece or as a stream of fragments.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Check that the runtime is reachable and the model is available
    async fn connect(&self) -> Result<()>;

    /// Generate a complete answer
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerationResult>;

    /// Generate an answer, handing each fragment to `on_chunk` as it arrives.
    ///
    /// The returned result carries the concatenation of all fragments.
    async fn generate_stream(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        on_chunk: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<GenerationResult>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;

    /// Generation settings for this provider's model
    fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model_id: self.model_id().to_string(),
            ..Default::default()
        }
    }
}

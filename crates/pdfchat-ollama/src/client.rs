//! Ollama client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use pdfchat_core::{Embedder, Error, GenerationConfig, GenerationResult, LLMProvider, Result};

use crate::config::OllamaConfig;
use crate::stream::NdjsonDecoder;

const TAGS_TIMEOUT: Duration = Duration::from_secs(5);
const EMBED_TIMEOUT: Duration = Duration::from_secs(300);

/// Ollama client
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
    embed_timeout: Duration,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        // Fail fast on a malformed base URL
        config.endpoint("/")?;

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            embed_timeout: EMBED_TIMEOUT,
        })
    }

    /// Create a new Ollama client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OllamaConfig::from_env()?)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Upper bound for one `/api/embed` request
    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Names of the models pulled into the runtime
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.config.endpoint("/api/tags")?)
            .timeout(TAGS_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Ollama returned status {} for /api/tags",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn generate_request<'a>(&'a self, prompt: &'a str, config: &'a GenerationConfig, stream: bool) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &config.model_id,
            prompt,
            stream,
            options: GenerateOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
            },
        }
    }

    async fn post_generate(&self, prompt: &str, config: &GenerationConfig, stream: bool) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.config.endpoint("/api/generate")?)
            .json(&self.generate_request(prompt, config, stream))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Ollama API error: {} - {}", status, error_text);
            return Err(Error::LLMProvider(format!(
                "Ollama API request failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    async fn perform_generation(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let response = self.post_generate(prompt, config, false).await?;
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(body.response.trim().to_string())
    }

    async fn perform_stream(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        on_chunk: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<String> {
        let response = self.post_generate(prompt, config, true).await?;

        let mut decoder = NdjsonDecoder::new();
        let mut answer = String::new();
        let mut body = response.bytes_stream();
        let mut done = false;

        'read: while let Some(bytes) = body.next().await {
            let bytes = bytes.map_err(|e| Error::Network(e.to_string()))?;
            for chunk in decoder.push(&bytes) {
                if let Some(text) = chunk.response.as_deref() {
                    on_chunk(text);
                    answer.push_str(text);
                }
                if chunk.done {
                    done = true;
                    break 'read;
                }
            }
        }

        // body ended without a trailing newline
        if !done {
            if let Some(text) = decoder.finish().and_then(|chunk| chunk.response) {
                on_chunk(&text);
                answer.push_str(&text);
            }
        }

        Ok(answer)
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn connect(&self) -> Result<()> {
        match self.list_models().await {
            Ok(models) => {
                info!("Connected to Ollama server at {}", self.config.base_url);
                if !models.iter().any(|name| name.contains(&self.config.model)) {
                    warn!(
                        "Model {} not found. Available models: {:?}. Pull it with 'ollama pull {}'",
                        self.config.model, models, self.config.model
                    );
                }
            }
            Err(Error::Configuration(msg)) => return Err(Error::Configuration(msg)),
            Err(e) => {
                error!("Cannot connect to Ollama server at {}: {}", self.config.base_url, e);
                info!("Please ensure Ollama is running: 'ollama serve'");
            }
        }
        Ok(())
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerationResult> {
        let text = match timeout(config.timeout, self.perform_generation(prompt, config)).await {
            Ok(result) => result?,
            Err(_) => {
                error!("Request to Ollama timed out");
                return Err(Error::Timeout("Request to Ollama timed out".to_string()));
            }
        };

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
        })
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        on_chunk: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<GenerationResult> {
        let text = match timeout(config.timeout, self.perform_stream(prompt, config, on_chunk)).await {
            Ok(result) => result?,
            Err(_) => {
                error!("Streaming request to Ollama timed out");
                return Err(Error::Timeout("Streaming request to Ollama timed out".to_string()));
            }
        };

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
        })
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }

    fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model_id: self.config.model.clone(),
            temperature: self.config.temperature,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("Ollama returned no embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let response = self
            .client
            .post(self.config.endpoint("/api/embed")?)
            .json(&request)
            .timeout(self.embed_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("Embedding request to Ollama timed out".to_string())
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "Embedding request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if body.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                body.embeddings.len()
            )));
        }

        Ok(body.embeddings)
    }

    fn model_id(&self) -> &str {
        &self.config.embedding_model
    }
}

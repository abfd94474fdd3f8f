//! Ollama configuration

use pdfchat_core::{AppConfig, Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the Ollama client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    pub temperature: f32,
}

impl OllamaConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_app_config(&AppConfig::from_env()?))
    }

    /// Take the Ollama-related settings out of the application config
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.ollama_base_url.clone(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
        }
    }

    /// Create configuration with explicit values
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            embedding_model: "nomic-embed-text".to_string(),
            temperature: 0.7,
        }
    }

    /// Resolve an API path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| Error::Configuration(format!("Invalid Ollama URL '{}': {}", self.base_url, e)))?;
        base.join(path)
            .map_err(|e| Error::Configuration(format!("Invalid Ollama endpoint '{}': {}", path, e)))
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new("http://localhost:11434", "llama3")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let config = OllamaConfig::new("http://localhost:11434", "llama3");
        assert_eq!(
            config.endpoint("/api/generate").unwrap().as_str(),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        let config = OllamaConfig::new("localhost without scheme", "llama3");
        assert!(matches!(config.endpoint("/api/tags"), Err(Error::Configuration(_))));
    }
}

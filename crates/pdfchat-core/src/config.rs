//! Application configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Error, Result};

/// Which backend turns text into vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Ollama's `/api/embed` endpoint
    Ollama,
    /// Offline hashed word features
    Hash,
}

impl FromStr for EmbeddingProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(EmbeddingProvider::Ollama),
            "hash" => Ok(EmbeddingProvider::Hash),
            other => Err(Error::Configuration(format!(
                "EMBEDDING_PROVIDER must be 'ollama' or 'hash', got '{}'",
                other
            ))),
        }
    }
}

/// Configuration for the whole application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub ollama_base_url: String,
    pub model: String,
    pub embedding_model: String,
    pub embedding_provider: EmbeddingProvider,
    pub temperature: f32,
    pub data_dir: PathBuf,
    pub collection_name: String,
    pub max_chat_history: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub enable_hybrid_search: bool,
    pub hybrid_alpha: f32,
    pub web_host: String,
    pub web_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_provider: EmbeddingProvider::Ollama,
            temperature: 0.7,
            data_dir: PathBuf::from("data"),
            collection_name: "rag_documents".to_string(),
            max_chat_history: 10,
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            enable_hybrid_search: true,
            hybrid_alpha: 0.7,
            web_host: "127.0.0.1".to_string(),
            web_port: 7860,
        }
    }
}

impl AppConfig {
    /// Create configuration from environment variables, after loading `.env`
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            ollama_base_url: lookup("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            model: lookup("OLLAMA_MODEL").unwrap_or(defaults.model),
            embedding_model: lookup("OLLAMA_EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_provider: parse_var(&lookup, "EMBEDDING_PROVIDER", defaults.embedding_provider)?,
            temperature: parse_var(&lookup, "TEMPERATURE", defaults.temperature)?,
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            collection_name: lookup("COLLECTION_NAME").unwrap_or(defaults.collection_name),
            max_chat_history: parse_var(&lookup, "MAX_CHAT_HISTORY", defaults.max_chat_history)?,
            chunk_size: parse_var(&lookup, "CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: parse_var(&lookup, "CHUNK_OVERLAP", defaults.chunk_overlap)?,
            top_k: parse_var(&lookup, "TOP_K", defaults.top_k)?,
            enable_hybrid_search: parse_var(&lookup, "ENABLE_HYBRID_SEARCH", defaults.enable_hybrid_search)?,
            hybrid_alpha: parse_var(&lookup, "HYBRID_ALPHA", defaults.hybrid_alpha)?,
            web_host: lookup("WEB_HOST").unwrap_or(defaults.web_host),
            web_port: parse_var(&lookup, "WEB_PORT", defaults.web_port)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.ollama_base_url).map_err(|e| {
            Error::Configuration(format!("OLLAMA_BASE_URL '{}' is not a valid URL: {}", self.ollama_base_url, e))
        })?;

        if self.chunk_size == 0 {
            return Err(Error::Configuration("CHUNK_SIZE must be greater than 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Configuration(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::Configuration("TOP_K must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.hybrid_alpha) {
            return Err(Error::Configuration(format!(
                "HYBRID_ALPHA must be between 0 and 1, got {}",
                self.hybrid_alpha
            )));
        }

        Ok(())
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }

    pub fn vectordb_dir(&self) -> PathBuf {
        self.data_dir.join("vectordb")
    }

    pub fn chat_history_dir(&self) -> PathBuf {
        self.data_dir.join("chat_history")
    }

    /// Create the data directories if they don't exist
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.documents_dir(), self.vectordb_dir(), self.chat_history_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| Error::Configuration(format!("{} has invalid value '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_debug_snapshot;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.model, "llama3");
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.max_chat_history, 10);
        assert_eq!(config.embedding_provider, EmbeddingProvider::Ollama);
        assert_eq!(config.documents_dir(), PathBuf::from("data").join("documents"));
    }

    #[test]
    fn test_config_snapshot() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OLLAMA_MODEL", "mistral"),
            ("EMBEDDING_PROVIDER", "hash"),
            ("TEMPERATURE", "0.5"),
            ("DATA_DIR", "/srv/pdfchat"),
            ("CHUNK_SIZE", "500"),
            ("CHUNK_OVERLAP", "50"),
            ("HYBRID_ALPHA", "0.5"),
        ]))
        .unwrap();

        assert_debug_snapshot!(config, @r#"
        AppConfig {
            ollama_base_url: "http://localhost:11434",
            model: "mistral",
            embedding_model: "nomic-embed-text",
            embedding_provider: Hash,
            temperature: 0.5,
            data_dir: "/srv/pdfchat",
            collection_name: "rag_documents",
            max_chat_history: 10,
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 5,
            enable_hybrid_search: true,
            hybrid_alpha: 0.5,
            web_host: "127.0.0.1",
            web_port: 7860,
        }
        "#);
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("OLLAMA_MODEL", "mistral"),
            ("CHUNK_SIZE", "500"),
            ("CHUNK_OVERLAP", "50"),
            ("ENABLE_HYBRID_SEARCH", "false"),
            ("EMBEDDING_PROVIDER", "HASH"),
            ("WEB_PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.model, "mistral");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert!(!config.enable_hybrid_search);
        assert_eq!(config.embedding_provider, EmbeddingProvider::Hash);
        assert_eq!(config.web_port, 8080);
    }

    #[test]
    fn test_invalid_number_is_configuration_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("TOP_K", "many")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("TOP_K"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let err = AppConfig::from_lookup(lookup_from(&[("CHUNK_SIZE", "100"), ("CHUNK_OVERLAP", "100")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_rejects_bad_url_and_alpha() {
        assert!(AppConfig::from_lookup(lookup_from(&[("OLLAMA_BASE_URL", "not a url")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("HYBRID_ALPHA", "1.5")])).is_err());
    }

    #[test]
    fn test_ensure_dirs_creates_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: tmp.path().join("data"),
            ..Default::default()
        };

        config.ensure_dirs().unwrap();

        assert!(config.documents_dir().is_dir());
        assert!(config.vectordb_dir().is_dir());
        assert!(config.chat_history_dir().is_dir());
    }
}

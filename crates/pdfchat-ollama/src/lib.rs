//! Ollama integration for pdfchat
//!
//! This crate provides the Ollama implementation of the `LLMProvider` and
//! `Embedder` traits, plus the prompt that grounds answers in retrieved passages.

mod client;
mod config;
mod prompt;
mod stream;

#[cfg(test)]
mod tests;

pub use client::OllamaClient;
pub use config::OllamaConfig;
pub use prompt::PromptBuilder;
pub use stream::{GenerateChunk, NdjsonDecoder};

// Re-export core types for convenience
pub use pdfchat_core::{Embedder, Error, GenerationConfig, GenerationResult, LLMProvider, Result};

//! Core traits and types for pdfchat
//!
//! This crate defines the types shared across the workspace: the error type,
//! application configuration, loaded documents, conversation records, and the
//! capability-facing traits for LLM providers, embedders and vector stores.

pub mod chat;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod vector_store;

pub use chat::{ChatExchange, ChatResponse, DatabaseInfo};
pub use config::{AppConfig, EmbeddingProvider};
pub use document::{Chunk, DocumentMetadata, LoadSummary, LoadedDocument, PageText};
pub use embedding::Embedder;
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use vector_store::{RetrievedChunk, SearchConfig, SearchResult, VectorDocument, VectorStore};

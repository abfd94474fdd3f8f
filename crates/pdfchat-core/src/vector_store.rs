//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A chunk stored in the vector store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorDocument {
    pub id: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub metadata: serde_json::Value,
    pub score: Option<f32>,
}

impl VectorDocument {
    /// Source filename, if recorded
    pub fn filename(&self) -> Option<&str> {
        self.metadata.get("filename").and_then(|v| v.as_str())
    }

    /// 1-based page the chunk was cut from
    pub fn page_number(&self) -> Option<u64> {
        self.metadata.get("page_number").and_then(|v| v.as_u64())
    }

    /// Position of the chunk among all chunks of its load
    pub fn global_chunk_id(&self) -> Option<u64> {
        self.metadata.get("global_chunk_id").and_then(|v| v.as_u64())
    }

    /// Section heading detected at the start of the chunk
    pub fn section(&self) -> Option<&str> {
        self.metadata.get("section").and_then(|v| v.as_str())
    }
}

/// A passage returned by retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    pub content: String,
    pub metadata: serde_json::Value,
    /// `1 - cosine similarity` for semantic hits, 0 for keyword-only hits
    pub distance: Option<f32>,
}

impl RetrievedChunk {
    pub fn filename(&self) -> Option<&str> {
        self.metadata.get("filename").and_then(|v| v.as_str())
    }

    pub fn page_number(&self) -> Option<u64> {
        self.metadata.get("page_number").and_then(|v| v.as_u64())
    }
}

impl From<VectorDocument> for RetrievedChunk {
    fn from(doc: VectorDocument) -> Self {
        Self {
            distance: doc.score.map(|s| 1.0 - s),
            content: doc.content,
            metadata: doc.metadata,
        }
    }
}

/// Search result from vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub documents: Vec<VectorDocument>,
    pub total: usize,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: None,
        }
    }
}

/// Trait for vector stores
///
/// A store holds one named collection of embedded chunks and answers
/// nearest-neighbour queries against it.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace documents by id
    async fn add_documents(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>>;

    /// Drop every chunk whose `filename` is in `filenames`, then insert
    /// `documents`, as one change
    async fn replace_files(&self, filenames: &[String], documents: Vec<VectorDocument>) -> Result<Vec<String>>;

    /// Search using a vector embedding
    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult>;

    /// Up to `limit` stored documents, in insertion order
    async fn all_documents(&self, limit: usize) -> Result<Vec<VectorDocument>>;

    /// Get a document by ID
    async fn get(&self, id: &str) -> Result<Option<VectorDocument>>;

    /// Delete a document by ID
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Clear all documents from the store
    async fn clear(&self) -> Result<()>;

    /// Get the total number of documents
    async fn count(&self) -> Result<usize>;

    /// Collection name
    fn name(&self) -> &str;

    /// Where the collection is persisted
    fn persist_directory(&self) -> String;
}

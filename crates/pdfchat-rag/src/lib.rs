//! Retrieval-augmented generation over PDF documents
//!
//! This crate turns PDFs into embedded chunks, keeps them in a local vector
//! store, and answers questions with passages retrieved from that store.

mod chatbot;
mod hash_embedder;
mod history;
mod loader;
mod retriever;
mod text_processor;
mod vector_store;

#[cfg(test)]
mod test_support;

pub use chatbot::RagChatbot;
pub use hash_embedder::HashEmbedder;
pub use history::ChatHistory;
pub use loader::DocumentLoader;
pub use retriever::Retriever;
pub use text_processor::{TextProcessor, query_keywords};
pub use vector_store::{LocalVectorStore, cosine_similarity};

// Re-export core types for convenience
pub use pdfchat_core::{
    ChatExchange, ChatResponse, DatabaseInfo, Error, LoadSummary, Result, RetrievedChunk, SearchConfig,
    SearchResult, VectorDocument, VectorStore,
};

//! Loaded PDF documents

use serde::{Deserialize, Serialize};

/// File-level facts recorded for every loaded PDF
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    pub filename: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: u64,
    pub page_count: usize,
}

/// Extracted text of one page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageText {
    /// 1-based
    pub page_number: usize,
    pub content: String,
}

/// A PDF with its text split by page. Pages with no text are absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadedDocument {
    pub metadata: DocumentMetadata,
    pub pages: Vec<PageText>,
}

impl LoadedDocument {
    /// Whole-document text with page markers
    pub fn content(&self) -> String {
        self.pages
            .iter()
            .map(|p| format!("--- Page {} ---\n{}", p.page_number, p.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A piece of a page ready to be embedded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub content: String,
    pub metadata: serde_json::Value,
}

/// Outcome of a load operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadSummary {
    pub documents: usize,
    pub chunks: usize,
}

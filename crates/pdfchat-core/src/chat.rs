//! Conversation types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::RetrievedChunk;

/// One question/answer turn plus the metadata of the passages it used
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatExchange {
    pub timestamp: DateTime<Local>,
    pub human: String,
    pub assistant: String,
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
}

impl ChatExchange {
    pub fn new(human: impl Into<String>, assistant: impl Into<String>, sources: Vec<serde_json::Value>) -> Self {
        Self {
            timestamp: Local::now(),
            human: human.into(),
            assistant: assistant.into(),
            sources,
        }
    }
}

/// Answer returned to a caller of the chatbot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<RetrievedChunk>,
}

/// Snapshot of the collection and session state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseInfo {
    pub name: String,
    pub document_count: usize,
    pub persist_directory: String,
    pub is_initialized: bool,
    pub chat_history_length: usize,
}

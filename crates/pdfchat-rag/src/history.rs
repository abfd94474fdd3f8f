//! Bounded chat history with JSON save/load

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use chrono::Local;
use tokio::fs;
use tracing::info;

use pdfchat_core::{ChatExchange, Error, Result};

/// Most recent exchanges of a conversation, oldest first
#[derive(Debug, Clone)]
pub struct ChatHistory {
    max_len: usize,
    exchanges: VecDeque<ChatExchange>,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ChatHistory {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
            exchanges: VecDeque::new(),
        }
    }

    /// Append an exchange, dropping the oldest beyond `max_len`
    pub fn push(&mut self, exchange: ChatExchange) {
        self.exchanges.push_back(exchange);
        self.truncate_front();
    }

    fn truncate_front(&mut self) {
        while self.exchanges.len() > self.max_len {
            self.exchanges.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// The last `n` exchanges, oldest first
    pub fn last(&self, n: usize) -> Vec<ChatExchange> {
        let skip = self.exchanges.len().saturating_sub(n);
        self.exchanges.iter().skip(skip).cloned().collect()
    }

    pub fn exchanges(&self) -> Vec<ChatExchange> {
        self.exchanges.iter().cloned().collect()
    }

    /// Write the history into `dir`. Only the final component of `filename` is used;
    /// without one the name is `chat_history_<timestamp>.json`.
    pub async fn save(&self, dir: &Path, filename: Option<&str>) -> Result<PathBuf> {
        let filename = match filename.and_then(|f| Path::new(f).file_name()) {
            Some(name) => name.to_string_lossy().into_owned(),
            None => format!("chat_history_{}.json", Local::now().format("%Y%m%d_%H%M%S")),
        };

        fs::create_dir_all(dir).await?;
        let path = dir.join(filename);

        let json = serde_json::to_string_pretty(&self.exchanges)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(&path, json).await?;

        info!("Chat history saved to {}", path.display());
        Ok(path)
    }

    /// Replace the current exchanges with those stored in `path`
    pub async fn load(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).await?;
        let exchanges: VecDeque<ChatExchange> = serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        self.exchanges = exchanges;
        self.truncate_front();

        info!("Chat history loaded from {}", path.display());
        Ok(())
    }
}

//! Text cleaning, chunking and keyword extraction

use regex::Regex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::LazyLock;
use tracing::{error, info};

use pdfchat_core::{Chunk, LoadedDocument};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s.,!?;:\-()]").unwrap());
static REPEATED_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+([.!?])").unwrap());
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").unwrap());

static SECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^(?:Section|§)\s*([IVXLCDMivxlcdm]+|\d+)",
        r"(?m)^(\d+\.\d+)\s",
        r"(?m)^[IVXLCDM]+\.",
        r"(?m)^[A-Z][A-Z\s]+\n",
        r"(?m)^\d+\.\s+[A-Z]",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const QUERY_STOP_WORDS: &[&str] = &["the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for"];

const KEYWORD_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are", "was",
    "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would", "could", "should",
];

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Splits page text into overlapping, cleaned chunks with metadata
#[derive(Debug, Clone)]
pub struct TextProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl TextProcessor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    /// Normalise whitespace and strip characters that carry no meaning for retrieval
    pub fn clean_text(&self, text: &str) -> String {
        let text = WHITESPACE.replace_all(text, " ");
        let text = DISALLOWED.replace_all(&text, "");
        let text = REPEATED_PUNCT.replace_all(&text, "$1");
        text.trim().to_string()
    }

    /// First heading-like match at the start of any line
    pub fn detect_section(&self, text: &str) -> Option<String> {
        SECTION_PATTERNS
            .iter()
            .find_map(|pattern| pattern.find(text))
            .map(|m| m.as_str().trim().to_string())
    }

    /// Recursive character splitting over `["\n\n", "\n", " ", ""]`
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = "";
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep;
                break;
            }
            if text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut good_splits: Vec<String> = Vec::new();
        for split in splits {
            if char_len(&split) < self.chunk_size {
                good_splits.push(split);
                continue;
            }
            if !good_splits.is_empty() {
                chunks.extend(self.merge_splits(&good_splits, separator));
                good_splits.clear();
            }
            if remaining.is_empty() {
                chunks.push(split);
            } else {
                chunks.extend(self.split_with(&split, remaining));
            }
        }
        if !good_splits.is_empty() {
            chunks.extend(self.merge_splits(&good_splits, separator));
        }
        chunks
    }

    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);
            let joiner = if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size && !current.is_empty() {
                Self::push_joined(&mut docs, &current, separator);

                // Drop from the front until the kept tail fits inside the overlap
                // and leaves room for the incoming split.
                loop {
                    let joiner = if current.is_empty() { 0 } else { sep_len };
                    let overflows = total > 0 && total + len + joiner > self.chunk_size;
                    if total <= self.chunk_overlap && !overflows {
                        break;
                    }
                    let Some(front) = current.pop_front() else { break };
                    let trailing = if current.is_empty() { 0 } else { sep_len };
                    total -= char_len(front) + trailing;
                }
            }

            let joiner = if current.is_empty() { 0 } else { sep_len };
            current.push_back(split);
            total += len + joiner;
        }

        Self::push_joined(&mut docs, &current, separator);
        docs
    }

    fn push_joined(docs: &mut Vec<String>, parts: &VecDeque<&str>, separator: &str) {
        let joined = parts.iter().copied().collect::<Vec<_>>().join(separator);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            docs.push(trimmed.to_string());
        }
    }

    /// Clean and split one page, attaching per-chunk metadata over `metadata`
    pub fn chunk_text(&self, text: &str, metadata: &Value) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let cleaned = self.clean_text(text);
        let pieces = self.split_text(&cleaned);

        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| {
                let mut chunk_metadata = json!({
                    "chunk_id": i,
                    "chunk_size": char_len(&piece),
                });
                if let (Some(target), Some(source)) = (chunk_metadata.as_object_mut(), metadata.as_object()) {
                    for (key, value) in source {
                        target.insert(key.clone(), value.clone());
                    }
                }
                if let Some(section) = self.detect_section(&piece) {
                    chunk_metadata["section"] = json!(section);
                }
                Chunk {
                    content: piece,
                    metadata: chunk_metadata,
                }
            })
            .collect();

        info!("Created {} chunks from text", chunks.len());
        chunks
    }

    /// Chunk every page of every document, numbering chunks across the batch
    pub fn process_documents(&self, documents: &[LoadedDocument]) -> Vec<Chunk> {
        let mut all_chunks = Vec::new();
        let mut global_chunk_id = 0usize;

        for doc in documents {
            let doc_metadata = match serde_json::to_value(&doc.metadata) {
                Ok(value) => value,
                Err(e) => {
                    error!("Error processing document {}: {}", doc.metadata.filename, e);
                    continue;
                }
            };

            for page in &doc.pages {
                let mut page_metadata = doc_metadata.clone();
                page_metadata["page_number"] = json!(page.page_number);

                for mut chunk in self.chunk_text(&page.content, &page_metadata) {
                    chunk.metadata["global_chunk_id"] = json!(global_chunk_id);
                    global_chunk_id += 1;
                    all_chunks.push(chunk);
                }
            }
        }

        info!("Total chunks created: {}", all_chunks.len());
        all_chunks
    }

    /// Most frequent meaningful words, ties in first-seen order
    pub fn extract_keywords(&self, text: &str, max_keywords: usize) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut order: Vec<&str> = Vec::new();
        let mut freq: HashMap<&str, usize> = HashMap::new();

        for word in WORD.find_iter(&lower).map(|m| m.as_str()) {
            if KEYWORD_STOP_WORDS.contains(&word) {
                continue;
            }
            let count = freq.entry(word).or_insert(0);
            if *count == 0 {
                order.push(word);
            }
            *count += 1;
        }

        // stable sort keeps first-seen order among equal counts
        order.sort_by(|a, b| freq[b].cmp(&freq[a]));
        order.into_iter().take(max_keywords).map(String::from).collect()
    }
}

/// Search terms taken from a user query: the first five non-stop words
pub fn query_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| !QUERY_STOP_WORDS.contains(w))
        .take(5)
        .map(String::from)
        .collect()
}

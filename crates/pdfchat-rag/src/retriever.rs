//! Semantic, keyword and hybrid retrieval over a vector store

use std::collections::HashMap;
use tracing::{debug, error};

use pdfchat_core::{Result, RetrievedChunk, SearchConfig, VectorDocument, VectorStore};

use crate::text_processor::query_keywords;

const KEYWORD_SCAN_LIMIT: usize = 1000;
const KEYWORD_MATCH_WEIGHT: f32 = 0.8;

/// Ranks stored chunks against a question
#[derive(Debug, Clone)]
pub struct Retriever {
    enable_hybrid: bool,
    alpha: f32,
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new(true, 0.7)
    }
}

impl Retriever {
    pub fn new(enable_hybrid: bool, alpha: f32) -> Self {
        Self {
            enable_hybrid,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Hybrid when enabled and query text is given, semantic otherwise.
    /// Store failures are logged and produce no results.
    pub async fn search(
        &self,
        store: &dyn VectorStore,
        query_embedding: &[f32],
        query_text: Option<&str>,
        top_k: usize,
    ) -> Vec<RetrievedChunk> {
        let outcome = match query_text {
            Some(text) if self.enable_hybrid && !text.trim().is_empty() => {
                self.hybrid_search(store, query_embedding, text, top_k).await
            }
            _ => self.semantic_search(store, query_embedding, top_k).await,
        };

        match outcome {
            Ok(results) => {
                debug!("Retrieved {} chunks", results.len());
                results
            }
            Err(e) => {
                error!("Error searching documents: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn semantic_search(
        &self,
        store: &dyn VectorStore,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let config = SearchConfig {
            top_k,
            score_threshold: None,
        };
        let result = store.search_by_vector(query_embedding, &config).await?;
        Ok(result.documents.into_iter().map(RetrievedChunk::from).collect())
    }

    /// Chunks containing any query keyword, ranked by how many they contain
    pub async fn keyword_search(
        &self,
        store: &dyn VectorStore,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let keywords = query_keywords(query_text);
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let documents = store.all_documents(KEYWORD_SCAN_LIMIT).await?;

        let mut scored: Vec<(usize, VectorDocument)> = documents
            .into_iter()
            .filter_map(|doc| {
                let lower = doc.content.to_lowercase();
                let hits = keywords.iter().filter(|k| lower.contains(k.as_str())).count();
                (hits > 0).then_some((hits, doc))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(_, doc)| RetrievedChunk {
                content: doc.content,
                metadata: doc.metadata,
                distance: Some(0.0),
            })
            .collect())
    }

    pub async fn hybrid_search(
        &self,
        store: &dyn VectorStore,
        query_embedding: &[f32],
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let candidates = top_k.saturating_mul(2);
        let semantic = self.semantic_search(store, query_embedding, candidates).await?;
        let keyword = self.keyword_search(store, query_text, candidates).await?;
        Ok(self.combine(semantic, keyword, top_k))
    }

    fn combine(&self, semantic: Vec<RetrievedChunk>, keyword: Vec<RetrievedChunk>, top_k: usize) -> Vec<RetrievedChunk> {
        let mut ranked: Vec<(f32, RetrievedChunk)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for chunk in semantic {
            let score = self.alpha * (1.0 - chunk.distance.unwrap_or(0.0));
            let key = combine_key(&chunk);
            match positions.get(&key) {
                Some(&i) => ranked[i] = (score, chunk),
                None => {
                    positions.insert(key, ranked.len());
                    ranked.push((score, chunk));
                }
            }
        }

        let keyword_score = (1.0 - self.alpha) * KEYWORD_MATCH_WEIGHT;
        for chunk in keyword {
            let key = combine_key(&chunk);
            match positions.get(&key) {
                Some(&i) => ranked[i].0 += keyword_score,
                None => {
                    positions.insert(key, ranked.len());
                    ranked.push((keyword_score, chunk));
                }
            }
        }

        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        ranked.into_iter().take(top_k).map(|(_, chunk)| chunk).collect()
    }
}

fn combine_key(chunk: &RetrievedChunk) -> String {
    let filename = chunk.filename().unwrap_or_default();
    let chunk_id = chunk
        .metadata
        .get("global_chunk_id")
        .map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        })
        .unwrap_or_default();
    format!("{}{}", filename, chunk_id)
}

//! Local vector store with JSON persistence

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::sync::Mutex;
use tracing::info;

use pdfchat_core::{Error, Result, SearchConfig, SearchResult, VectorDocument, VectorStore};

/// Cosine similarity; 0 for mismatched lengths or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[derive(Debug, Deserialize)]
struct CollectionFile {
    name: String,
    documents: Vec<VectorDocument>,
}

#[derive(Serialize)]
struct CollectionFileRef<'a> {
    name: &'a str,
    documents: &'a [VectorDocument],
}

/// Documents in insertion order plus an id index
#[derive(Debug, Default, Clone)]
struct Collection {
    documents: Vec<VectorDocument>,
    positions: HashMap<String, usize>,
}

impl Collection {
    fn new(documents: Vec<VectorDocument>) -> Self {
        let mut collection = Self::default();
        for document in documents {
            collection.upsert(document);
        }
        collection
    }

    fn upsert(&mut self, document: VectorDocument) {
        match self.positions.get(&document.id) {
            Some(&i) => self.documents[i] = document,
            None => {
                self.positions.insert(document.id.clone(), self.documents.len());
                self.documents.push(document);
            }
        }
    }

    /// Keep matching documents; returns how many were removed
    fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&VectorDocument) -> bool,
    {
        let before = self.documents.len();
        self.documents.retain(keep);
        if self.documents.len() != before {
            self.positions = self
                .documents
                .iter()
                .enumerate()
                .map(|(i, d)| (d.id.clone(), i))
                .collect();
        }
        before - self.documents.len()
    }

    fn get(&self, id: &str) -> Option<&VectorDocument> {
        self.positions.get(id).map(|&i| &self.documents[i])
    }
}

/// In-process collection, optionally persisted to `<dir>/<name>.json`
pub struct LocalVectorStore {
    name: String,
    directory: Option<PathBuf>,
    collection: RwLock<Collection>,
    persist_lock: Mutex<()>,
}

impl LocalVectorStore {
    /// Create a store that lives only in memory
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: None,
            collection: RwLock::new(Collection::default()),
            persist_lock: Mutex::new(()),
        }
    }

    /// Open (or create) a persisted collection
    pub fn open(directory: impl AsRef<Path>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;

        let file = Self::collection_path(&directory, &name);
        let documents = if file.exists() {
            let content = std::fs::read_to_string(&file)?;
            let stored: CollectionFile = serde_json::from_str(&content)
                .map_err(|e| Error::VectorStore(format!("Corrupt collection file {}: {}", file.display(), e)))?;
            info!("Loaded existing collection: {} ({} documents)", stored.name, stored.documents.len());
            stored.documents
        } else {
            info!("Created new collection: {}", name);
            Vec::new()
        };

        Ok(Self {
            name,
            directory: Some(directory),
            collection: RwLock::new(Collection::new(documents)),
            persist_lock: Mutex::new(()),
        })
    }

    fn collection_path(directory: &Path, name: &str) -> PathBuf {
        directory.join(format!("{}.json", name))
    }

    fn lock_error<T>(e: T) -> Error
    where
        T: std::fmt::Display,
    {
        Error::VectorStore(format!("Lock error: {}", e))
    }

    async fn persist(&self, documents: &[VectorDocument]) -> Result<()> {
        let Some(directory) = &self.directory else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(&CollectionFileRef {
            name: &self.name,
            documents,
        })?;
        tokio::fs::write(Self::collection_path(directory, &self.name), content).await?;
        Ok(())
    }

    /// Apply `change` to a copy, write the copy, then swap it in.
    /// A failed write leaves the collection untouched.
    async fn commit<R, F>(&self, change: F) -> Result<R>
    where
        F: FnOnce(&mut Collection) -> R + Send,
        R: Send,
    {
        let _guard = self.persist_lock.lock().await;

        let mut next = self.collection.read().map_err(Self::lock_error)?.clone();
        let outcome = change(&mut next);
        self.persist(&next.documents).await?;

        *self.collection.write().map_err(Self::lock_error)? = next;
        Ok(outcome)
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn add_documents(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let ids = self
            .commit(move |collection| {
                let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
                for document in documents {
                    collection.upsert(document);
                }
                ids
            })
            .await?;

        info!("Added {} documents to collection: {}", ids.len(), self.name);
        Ok(ids)
    }

    async fn replace_files(&self, filenames: &[String], documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let (removed, ids) = self
            .commit(move |collection| {
                let removed = collection.retain(|d| !d.filename().is_some_and(|f| filenames.iter().any(|n| n == f)));
                let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
                for document in documents {
                    collection.upsert(document);
                }
                (removed, ids)
            })
            .await?;

        info!(
            "Replaced {} chunks with {} in collection: {}",
            removed,
            ids.len(),
            self.name
        );
        Ok(ids)
    }

    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        let collection = self.collection.read().map_err(Self::lock_error)?;

        let mut results: Vec<VectorDocument> = collection
            .documents
            .iter()
            .filter_map(|doc| {
                let embedding = doc.embedding.as_ref()?;
                let mut scored = doc.clone();
                scored.score = Some(cosine_similarity(vector, embedding));
                Some(scored)
            })
            .filter(|doc| match config.score_threshold {
                Some(threshold) => doc.score.unwrap_or(0.0) >= threshold,
                None => true,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(config.top_k);

        let total = results.len();
        Ok(SearchResult {
            documents: results,
            total,
        })
    }

    async fn all_documents(&self, limit: usize) -> Result<Vec<VectorDocument>> {
        let collection = self.collection.read().map_err(Self::lock_error)?;
        Ok(collection.documents.iter().take(limit).cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<VectorDocument>> {
        let collection = self.collection.read().map_err(Self::lock_error)?;
        Ok(collection.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        if self.get(id).await?.is_none() {
            return Ok(false);
        }
        let removed = self.commit(|collection| collection.retain(|d| d.id != id)).await?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> Result<()> {
        self.commit(|collection| *collection = Collection::default()).await?;
        info!("Cleared all documents from collection: {}", self.name);
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let collection = self.collection.read().map_err(Self::lock_error)?;
        Ok(collection.documents.len())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn persist_directory(&self) -> String {
        self.directory
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, content: &str, embedding: Option<Vec<f32>>) -> VectorDocument {
        VectorDocument {
            id: id.to_string(),
            content: content.to_string(),
            embedding,
            metadata: json!({"filename": "test.pdf"}),
            score: None,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_add_get_count_and_replace() {
        let store = LocalVectorStore::in_memory("test");

        store
            .add_documents(vec![doc("a", "first", None), doc("b", "second", None)])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        store.add_documents(vec![doc("a", "replaced", None)]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.get("a").await.unwrap().unwrap().content, "replaced");

        let ordered: Vec<String> = store.all_documents(10).await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ordered, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_search_by_vector_orders_and_truncates() {
        let store = LocalVectorStore::in_memory("test");
        store
            .add_documents(vec![
                doc("x", "x axis", Some(vec![1.0, 0.0])),
                doc("y", "y axis", Some(vec![0.0, 1.0])),
                doc("xy", "diagonal", Some(vec![1.0, 1.0])),
                doc("none", "no vector", None),
            ])
            .await
            .unwrap();

        let config = SearchConfig { top_k: 2, score_threshold: None };
        let result = store.search_by_vector(&[1.0, 0.1], &config).await.unwrap();

        let ids: Vec<&str> = result.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "xy"]);
        assert_eq!(result.total, 2);
        assert!(result.documents[0].score.unwrap() > result.documents[1].score.unwrap());
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = LocalVectorStore::open(dir.path(), "papers").unwrap();
            store
                .add_documents(vec![doc("p_0", "persisted", Some(vec![0.5, 0.5]))])
                .await
                .unwrap();
        }

        let reopened = LocalVectorStore::open(dir.path(), "papers").unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
        assert_eq!(reopened.get("p_0").await.unwrap().unwrap().content, "persisted");
        assert_eq!(reopened.persist_directory(), dir.path().display().to_string());

        reopened.clear().await.unwrap();
        let again = LocalVectorStore::open(dir.path(), "papers").unwrap();
        assert_eq!(again.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = LocalVectorStore::in_memory("test");
        store.add_documents(vec![doc("a", "first", None)]).await.unwrap();

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_replace_files_drops_stale_chunks() {
        let store = LocalVectorStore::in_memory("test");
        let mut other = doc("other_0", "kept", None);
        other.metadata = json!({"filename": "other.pdf"});
        store
            .add_documents(vec![doc("test.pdf_0", "old", None), doc("test.pdf_1", "old tail", None), other])
            .await
            .unwrap();

        let ids = store
            .replace_files(&["test.pdf".to_string()], vec![doc("test.pdf_5", "new", None)])
            .await
            .unwrap();

        assert_eq!(ids, vec!["test.pdf_5"]);
        let ordered: Vec<String> = store.all_documents(10).await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ordered, vec!["other_0", "test.pdf_5"]);
        assert!(store.get("test.pdf_1").await.unwrap().is_none());
        assert_eq!(store.get("test.pdf_5").await.unwrap().unwrap().content, "new");
    }

    #[tokio::test]
    async fn test_failed_write_leaves_collection_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let vectordb = dir.path().join("vectordb");

        let store = LocalVectorStore::open(&vectordb, "papers").unwrap();
        store.add_documents(vec![doc("a", "first", None)]).await.unwrap();

        std::fs::remove_dir_all(&vectordb).unwrap();

        assert!(store.add_documents(vec![doc("b", "second", None)]).await.is_err());
        assert!(store.clear().await.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get("b").await.unwrap().is_none());
        assert_eq!(store.get("a").await.unwrap().unwrap().content, "first");
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();

        let err = LocalVectorStore::open(dir.path(), "broken").err().unwrap();
        assert!(matches!(err, Error::VectorStore(_)));
    }
}

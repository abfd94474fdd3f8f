//! Retrieval-augmented chat over loaded PDFs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use pdfchat_core::{
    AppConfig, ChatExchange, ChatResponse, Chunk, DatabaseInfo, Embedder, Error, LLMProvider, LoadSummary,
    Result, RetrievedChunk, VectorDocument, VectorStore,
};
use pdfchat_ollama::PromptBuilder;

use crate::history::ChatHistory;
use crate::loader::DocumentLoader;
use crate::retriever::Retriever;
use crate::text_processor::TextProcessor;
use crate::vector_store::LocalVectorStore;

const EMBED_BATCH_SIZE: usize = 64;
const NOT_INITIALIZED: &str = "Please load documents first before asking questions.";

/// Chatbot that answers questions from the passages of loaded PDFs
pub struct RagChatbot<V: VectorStore> {
    config: AppConfig,
    loader: DocumentLoader,
    processor: TextProcessor,
    retriever: Retriever,
    prompt_builder: PromptBuilder,
    llm: Arc<dyn LLMProvider>,
    embedder: Arc<dyn Embedder>,
    store: V,
    history: Mutex<ChatHistory>,
    initialized: AtomicBool,
}

impl RagChatbot<LocalVectorStore> {
    /// Open the persisted collection under the configured data directory
    pub async fn open(config: AppConfig, llm: Arc<dyn LLMProvider>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let store = LocalVectorStore::open(config.vectordb_dir(), config.collection_name.clone())?;
        Self::new(config, llm, embedder, store).await
    }
}

impl<V: VectorStore> RagChatbot<V> {
    pub async fn new(
        config: AppConfig,
        llm: Arc<dyn LLMProvider>,
        embedder: Arc<dyn Embedder>,
        store: V,
    ) -> Result<Self> {
        let existing = store.count().await?;
        if existing > 0 {
            info!("Collection {} already holds {} chunks", store.name(), existing);
        }

        let chatbot = Self {
            loader: DocumentLoader::new(),
            processor: TextProcessor::new(config.chunk_size, config.chunk_overlap),
            retriever: Retriever::new(config.enable_hybrid_search, config.hybrid_alpha),
            prompt_builder: PromptBuilder::new(),
            history: Mutex::new(ChatHistory::new(config.max_chat_history)),
            initialized: AtomicBool::new(existing > 0),
            config,
            llm,
            embedder,
            store,
        };

        info!("RAG chatbot initialized with model {}", chatbot.llm.model_id());
        Ok(chatbot)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &V {
        &self.store
    }

    pub fn llm(&self) -> &Arc<dyn LLMProvider> {
        &self.llm
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Load a PDF file or a directory of PDFs into the vector store
    pub async fn load_documents(&self, path: &Path) -> Result<LoadSummary> {
        info!("Loading documents from: {}", path.display());

        let loader = self.loader.clone();
        let owned: PathBuf = path.to_path_buf();
        let documents = tokio::task::spawn_blocking(move || loader.load_path(&owned))
            .await
            .map_err(|e| Error::Other(format!("Document loading task failed: {}", e)))??;

        if documents.is_empty() {
            warn!("No documents found to load");
            return Err(Error::DocumentLoader("No documents found to load".to_string()));
        }

        info!("Processing documents into chunks...");
        let chunks = self.processor.process_documents(&documents);
        if chunks.is_empty() {
            warn!("No chunks created from documents");
            return Err(Error::DocumentLoader("No chunks created from documents".to_string()));
        }

        info!("Generating embeddings...");
        let vector_documents = self.embed_chunks(chunks).await?;

        info!("Adding documents to vector database...");
        let chunk_count = vector_documents.len();
        let filenames: Vec<String> = documents.iter().map(|d| d.metadata.filename.clone()).collect();
        self.store.replace_files(&filenames, vector_documents).await?;

        self.initialized.store(true, Ordering::SeqCst);
        info!("Successfully loaded {} documents with {} chunks", documents.len(), chunk_count);

        Ok(LoadSummary {
            documents: documents.len(),
            chunks: chunk_count,
        })
    }

    async fn embed_chunks(&self, chunks: Vec<Chunk>) -> Result<Vec<VectorDocument>> {
        let mut vector_documents = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            for (chunk, embedding) in batch.iter().zip(embeddings) {
                vector_documents.push(VectorDocument {
                    id: chunk_id(&chunk.metadata),
                    content: chunk.content.clone(),
                    embedding: Some(embedding),
                    metadata: chunk.metadata.clone(),
                    score: None,
                });
            }
        }

        Ok(vector_documents)
    }

    async fn retrieve(&self, message: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed(message).await?;
        Ok(self
            .retriever
            .search(&self.store, &query_embedding, Some(message), top_k)
            .await)
    }

    async fn prepare(&self, message: &str, top_k: usize) -> Result<(String, Vec<RetrievedChunk>)> {
        if message.trim().is_empty() {
            return Err(Error::InvalidInput("Message cannot be empty".to_string()));
        }
        if !self.is_initialized() {
            return Err(Error::NotInitialized(NOT_INITIALIZED.to_string()));
        }

        let sources = self.retrieve(message, top_k).await?;
        let history = self.history.lock().await.exchanges();
        let prompt = self.prompt_builder.build(message, &sources, &history);
        Ok((prompt, sources))
    }

    async fn record(&self, message: &str, answer: &str, sources: &[RetrievedChunk]) {
        let metadata: Vec<Value> = sources.iter().map(|s| s.metadata.clone()).collect();
        self.history
            .lock()
            .await
            .push(ChatExchange::new(message, answer, metadata));
    }

    /// Answer a question from the `top_k` most relevant passages
    pub async fn chat(&self, message: &str, top_k: usize) -> Result<ChatResponse> {
        let (prompt, sources) = self.prepare(message, top_k).await?;

        let result = self
            .llm
            .generate(&prompt, &self.llm.generation_config())
            .await
            .map_err(|e| {
                error!("Error in chat: {}", e);
                e
            })?;

        self.record(message, &result.text, &sources).await;
        Ok(ChatResponse {
            answer: result.text,
            sources,
        })
    }

    /// Answer a question, handing each generated fragment to `on_chunk`.
    /// The exchange is recorded once the stream completes.
    pub async fn stream_chat(
        &self,
        message: &str,
        top_k: usize,
        on_chunk: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<ChatResponse> {
        let (prompt, sources) = self.prepare(message, top_k).await?;

        let result = self
            .llm
            .generate_stream(&prompt, &self.llm.generation_config(), on_chunk)
            .await
            .map_err(|e| {
                error!("Error in streaming chat: {}", e);
                e
            })?;

        self.record(message, &result.text, &sources).await;
        Ok(ChatResponse {
            answer: result.text,
            sources,
        })
    }

    /// Retrieval without generation. Empty until documents are loaded.
    pub async fn get_relevant_sources(&self, message: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        if !self.is_initialized() {
            return Ok(Vec::new());
        }
        self.retrieve(message, top_k).await
    }

    pub fn extract_keywords(&self, text: &str, max_keywords: usize) -> Vec<String> {
        self.processor.extract_keywords(text, max_keywords)
    }

    pub async fn chat_history(&self) -> Vec<ChatExchange> {
        self.history.lock().await.exchanges()
    }

    pub async fn clear_chat_history(&self) {
        self.history.lock().await.clear();
        info!("Chat history cleared");
    }

    /// Save into the chat history directory; returns the written path
    pub async fn save_chat_history(&self, filename: Option<&str>) -> Result<PathBuf> {
        let history = self.history.lock().await;
        history.save(&self.config.chat_history_dir(), filename).await
    }

    pub async fn load_chat_history(&self, path: &Path) -> Result<()> {
        let mut history = self.history.lock().await;
        history.load(path).await
    }

    pub async fn get_database_info(&self) -> Result<DatabaseInfo> {
        Ok(DatabaseInfo {
            name: self.store.name().to_string(),
            document_count: self.store.count().await?,
            persist_directory: self.store.persist_directory(),
            is_initialized: self.is_initialized(),
            chat_history_length: self.history.lock().await.len(),
        })
    }

    /// Remove every stored chunk; questions are refused until the next load
    pub async fn clear_database(&self) -> Result<()> {
        self.store.clear().await?;
        self.initialized.store(false, Ordering::SeqCst);
        info!("Database cleared");
        Ok(())
    }
}

/// Store id of a chunk: `<filename>_<global_chunk_id>`
fn chunk_id(metadata: &Value) -> String {
    let filename = metadata.get("filename").and_then(|v| v.as_str()).unwrap_or("unknown");
    let global = metadata.get("global_chunk_id").and_then(|v| v.as_u64()).unwrap_or(0);
    format!("{}_{}", filename, global)
}

//! Question answering and retrieval endpoints

use axum::{
    Json,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tracing::warn;

use pdfchat_core::{ChatResponse, Error};

use crate::{AppState, error::AppError};

const KEYWORDS_PER_SOURCE: usize = 5;
const MAX_TOP_K: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesQuery {
    #[serde(default)]
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct SourceView {
    pub content: String,
    pub metadata: Value,
    pub distance: Option<f32>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub query: String,
    pub sources: Vec<SourceView>,
}

fn require_text(text: &str, what: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} cannot be empty", what)));
    }
    Ok(())
}

/// `top_k` from the request, or the configured default; 1..=50
fn resolve_top_k(requested: Option<usize>, default: usize) -> Result<usize, AppError> {
    match requested {
        None => Ok(default),
        Some(k) if (1..=MAX_TOP_K).contains(&k) => Ok(k),
        Some(k) => Err(AppError::BadRequest(format!(
            "top_k must be between 1 and {}, got {}",
            MAX_TOP_K, k
        ))),
    }
}

/// `POST /api/chat`
pub async fn chat(
    State(chatbot): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    require_text(&request.message, "Message")?;
    let top_k = resolve_top_k(request.top_k, chatbot.config().top_k)?;

    Ok(Json(chatbot.chat(&request.message, top_k).await?))
}

enum StreamEvent {
    Chunk(String),
    Done(ChatResponse),
    Failed(String),
}

impl StreamEvent {
    fn into_sse(self) -> Event {
        let (name, data) = match self {
            StreamEvent::Chunk(text) => ("chunk", json!({ "text": text })),
            StreamEvent::Done(response) => ("done", json!(response)),
            StreamEvent::Failed(message) => ("error", json!({ "message": message })),
        };

        Event::default()
            .event(name)
            .json_data(data)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
    }
}

/// `POST /api/chat/stream`: `chunk` events as text arrives, then `done` or `error`
pub async fn chat_stream(
    State(chatbot): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    require_text(&request.message, "Message")?;
    let top_k = resolve_top_k(request.top_k, chatbot.config().top_k)?;
    if !chatbot.is_initialized() {
        return Err(Error::NotInitialized("Please load documents first before asking questions.".to_string()).into());
    }

    let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();

    tokio::spawn(async move {
        let chunk_tx = tx.clone();
        let mut on_chunk = move |chunk: &str| {
            let _ = chunk_tx.send(StreamEvent::Chunk(chunk.to_string()));
        };

        let final_event = match chatbot.stream_chat(&request.message, top_k, &mut on_chunk).await {
            Ok(response) => StreamEvent::Done(response),
            Err(e) => {
                warn!("Streaming chat failed: {}", e);
                StreamEvent::Failed(e.to_string())
            }
        };
        let _ = tx.send(final_event);
    });

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event.into_sse()), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// `GET /api/sources?query=&top_k=`
pub async fn sources(
    State(chatbot): State<AppState>,
    Query(params): Query<SourcesQuery>,
) -> Result<Json<SourcesResponse>, AppError> {
    require_text(&params.query, "Query")?;
    let top_k = resolve_top_k(params.top_k, chatbot.config().top_k)?;

    let sources = chatbot
        .get_relevant_sources(&params.query, top_k)
        .await?
        .into_iter()
        .map(|chunk| SourceView {
            keywords: chatbot.extract_keywords(&chunk.content, KEYWORDS_PER_SOURCE),
            content: chunk.content,
            metadata: chunk.metadata,
            distance: chunk.distance,
        })
        .collect();

    Ok(Json(SourcesResponse {
        query: params.query,
        sources,
    }))
}

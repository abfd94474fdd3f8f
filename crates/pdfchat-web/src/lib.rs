//! Browser interface for pdfchat
//!
//! Serves a single-page UI plus the JSON and server-sent-event API it talks to.
//!
//! # Routes
//!
//! - `GET /` - chat, documents and sources panels
//! - `GET /health` - liveness
//! - `GET /api/info` - collection status
//! - `POST /api/documents` - multipart PDF upload
//! - `POST /api/documents/load-directory` - load the configured documents directory
//! - `DELETE /api/documents` - clear the collection
//! - `POST /api/chat` - answer with sources
//! - `POST /api/chat/stream` - answer as server-sent events
//! - `GET /api/sources` - retrieval only, with keywords per passage
//! - `GET|DELETE /api/history`, `POST /api/history/save`

mod error;
mod handlers;


use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use pdfchat_core::Result;
use pdfchat_rag::{LocalVectorStore, RagChatbot};

pub use error::AppError;

/// Shared chatbot handed to every handler
pub type AppState = Arc<RagChatbot<LocalVectorStore>>;

const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health_check))
        .route("/api/info", get(handlers::health::database_info))
        .route(
            "/api/documents",
            post(handlers::documents::upload_documents)
                .delete(handlers::documents::clear_documents)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/documents/load-directory",
            post(handlers::documents::load_directory),
        )
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/chat/stream", post(handlers::chat::chat_stream))
        .route("/api/sources", get(handlers::chat::sources))
        .route(
            "/api/history",
            get(handlers::history::export_history).delete(handlers::history::clear_history),
        )
        .route("/api/history/save", post(handlers::history::save_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until the process stops
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web interface listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

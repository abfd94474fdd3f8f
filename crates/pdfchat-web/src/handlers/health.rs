//! Page, liveness and collection status endpoints

use axum::{Json, extract::State, response::Html};
use serde::Serialize;

use pdfchat_core::DatabaseInfo;

use crate::{AppState, error::AppError};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub initialized: bool,
}

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /health`
pub async fn health_check(State(chatbot): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: chatbot.llm().model_id().to_string(),
        initialized: chatbot.is_initialized(),
    })
}

/// `GET /api/info`
pub async fn database_info(State(chatbot): State<AppState>) -> Result<Json<DatabaseInfo>, AppError> {
    Ok(Json(chatbot.get_database_info().await?))
}

//! Chat history endpoints

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use pdfchat_core::ChatExchange;

use crate::{AppState, error::AppError, handlers::chat::MessageResponse};

#[derive(Debug, Default, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub path: String,
}

/// `GET /api/history`
pub async fn export_history(State(chatbot): State<AppState>) -> Json<Vec<ChatExchange>> {
    Json(chatbot.chat_history().await)
}

/// `DELETE /api/history`
pub async fn clear_history(State(chatbot): State<AppState>) -> Json<MessageResponse> {
    chatbot.clear_chat_history().await;
    Json(MessageResponse::new("Chat history cleared"))
}

/// `POST /api/history/save`
pub async fn save_history(
    State(chatbot): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, AppError> {
    let path = chatbot.save_chat_history(request.filename.as_deref()).await?;
    Ok(Json(SaveResponse {
        path: path.display().to_string(),
    }))
}

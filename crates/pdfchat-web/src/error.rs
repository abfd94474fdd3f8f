//! HTTP error responses
//!
//! Handlers return `Result<T, AppError>`; errors become JSON bodies of the form
//! `{"error": {"code": "...", "message": "..."}}`.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use pdfchat_core::Error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Failure reported by the chatbot or one of its components
    #[error(transparent)]
    Core(#[from] Error),

    /// Request body or parameters are invalid.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) | AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Core(e) => match e {
                Error::NotInitialized(_) => (StatusCode::CONFLICT, "not_initialized"),
                Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
                Error::DocumentLoader(_) => (StatusCode::BAD_REQUEST, "document_error"),
                Error::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
                Error::LLMProvider(_) | Error::Network(_) | Error::Embedding(_) => {
                    (StatusCode::BAD_GATEWAY, "model_unavailable")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::from(Error::NotInitialized("load first".into())), StatusCode::CONFLICT),
            (AppError::from(Error::InvalidInput("empty".into())), StatusCode::BAD_REQUEST),
            (AppError::from(Error::DocumentLoader("bad pdf".into())), StatusCode::BAD_REQUEST),
            (AppError::from(Error::Timeout("slow".into())), StatusCode::GATEWAY_TIMEOUT),
            (AppError::from(Error::LLMProvider("down".into())), StatusCode::BAD_GATEWAY),
            (AppError::from(Error::Embedding("down".into())), StatusCode::BAD_GATEWAY),
            (AppError::from(Error::VectorStore("lock".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::NotFound("missing".into()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("nope".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}

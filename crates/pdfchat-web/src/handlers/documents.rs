//! Document upload, directory loading and collection reset
//!
//! - POST /api/documents - multipart PDF upload
//! - POST /api/documents/load-directory - load the configured documents directory
//! - DELETE /api/documents - empty the vector store

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use pdfchat_core::LoadSummary;

use crate::{AppState, error::AppError, handlers::chat::MessageResponse};

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub message: String,
    pub documents: usize,
    pub chunks: usize,
    pub document_count: usize,
}

async fn load_response(state: &AppState, summary: LoadSummary) -> Result<Json<LoadResponse>, AppError> {
    let document_count = state.get_database_info().await?.document_count;
    Ok(Json(LoadResponse {
        message: format!(
            "Successfully loaded {} documents ({} chunks). Database now holds {} chunks.",
            summary.documents, summary.chunks, document_count
        ),
        documents: summary.documents,
        chunks: summary.chunks,
        document_count,
    }))
}

fn is_pdf(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Upload one or more PDFs in the `files` form field.
///
/// Files are written under their base name into a scratch directory that is
/// removed once loading finishes. Any non-PDF part rejects the whole request.
pub async fn upload_documents(
    State(chatbot): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<LoadResponse>, AppError> {
    let scratch = tempfile::tempdir().map_err(pdfchat_core::Error::from)?;
    let mut saved = 0usize;

    while let Some(field) = multipart.next_field().await? {
        let Some(original) = field.file_name().map(str::to_string) else {
            continue;
        };
        let Some(basename) = Path::new(&original).file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Err(AppError::BadRequest(format!("Invalid file name: {}", original)));
        };
        if !is_pdf(&basename) {
            return Err(AppError::BadRequest(format!(
                "Unsupported file type: {}. Only PDF files are supported.",
                basename
            )));
        }

        let bytes = field.bytes().await?;
        tokio::fs::write(scratch.path().join(&basename), &bytes)
            .await
            .map_err(pdfchat_core::Error::from)?;
        info!("Received upload {} ({} bytes)", basename, bytes.len());
        saved += 1;
    }

    if saved == 0 {
        return Err(AppError::BadRequest("No PDF files were uploaded".to_string()));
    }

    let summary = chatbot.load_documents(scratch.path()).await?;
    load_response(&chatbot, summary).await
}

/// Load every PDF in the configured documents directory
pub async fn load_directory(State(chatbot): State<AppState>) -> Result<Json<LoadResponse>, AppError> {
    let dir = chatbot.config().documents_dir();
    if !dir.is_dir() {
        return Err(AppError::NotFound(format!("Documents directory not found: {}", dir.display())));
    }

    let summary = chatbot.load_documents(&dir).await?;
    load_response(&chatbot, summary).await
}

pub async fn clear_documents(State(chatbot): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    chatbot.clear_database().await?;
    Ok(Json(MessageResponse::new("Database cleared")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf("paper.pdf"));
        assert!(is_pdf("SCAN.PDF"));
        assert!(!is_pdf("notes.txt"));
        assert!(!is_pdf("pdf"));
    }
}

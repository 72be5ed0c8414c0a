use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use super::error_response::error_response;
use crate::application::services::UploadError;
use crate::domain::UploadedFile;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub detail: String,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut batch = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return error_response(
                    e.status(),
                    format!("Failed to read upload: {}", e.body_text()),
                );
            }
        };

        // Plain form fields carry no file name.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let declared_mime = field.content_type().map(str::to_string);

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, filename = %filename, "Failed to read file bytes");
                return error_response(
                    e.status(),
                    format!("Failed to read {}: {}", filename, e.body_text()),
                );
            }
        };

        tracing::debug!(
            filename = %filename,
            content_type = declared_mime.as_deref().unwrap_or("unknown"),
            bytes = data.len(),
            "File received"
        );

        batch.push(UploadedFile::new(filename, declared_mime, data));
    }

    match state.upload_service.upload(batch).await {
        Ok(outcome) => {
            tracing::info!(
                session_id = %outcome.session_id,
                chunk_count = outcome.chunk_count,
                "Upload successful"
            );
            (
                StatusCode::OK,
                Json(UploadResponse {
                    session_id: outcome.session_id.to_string(),
                    detail: "Files processed successfully.".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => upload_error_response(&e),
    }
}

fn upload_error_response(error: &UploadError) -> axum::response::Response {
    if error.is_client_error() {
        tracing::warn!(error = %error, "Upload rejected");
        return error_response(StatusCode::BAD_REQUEST, error.to_string());
    }

    tracing::error!(error = %error, "Upload failed");
    let detail = match error {
        UploadError::Staging(_) => "Failed to store the uploaded files.".to_string(),
        UploadError::Extraction(_) => format!("Failed to process the PDF: {}", error),
        UploadError::OcrUnavailable(_) | UploadError::Ocr { .. } => error.to_string(),
        UploadError::Splitting(_) => "Failed to split document text.".to_string(),
        UploadError::Indexing(_) => "Failed to create retriever.".to_string(),
        _ => format!("An internal error occurred: {}", error),
    };
    error_response(StatusCode::INTERNAL_SERVER_ERROR, detail)
}

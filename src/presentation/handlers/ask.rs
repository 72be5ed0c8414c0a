use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use super::error_response::error_response;
use crate::application::services::AskError;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

pub const SESSION_NOT_FOUND_DETAIL: &str = "Session not found. Please upload the document again.";

#[derive(Deserialize)]
pub struct AskRequest {
    pub session_id: String,
    pub question: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[tracing::instrument(skip(state, request), fields(session_id = %request.session_id))]
pub async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> impl IntoResponse {
    tracing::debug!(question = %sanitize_prompt(&request.question), "Processing question");

    match state
        .registry
        .ask(&request.session_id, &request.question)
        .await
    {
        Ok(answer) => {
            tracing::info!(sources_count = answer.sources.len(), "Question answered");
            (StatusCode::OK, Json(AskResponse { answer: answer.text })).into_response()
        }
        Err(AskError::SessionNotFound(_)) => {
            tracing::warn!("Ask for unknown session");
            error_response(StatusCode::NOT_FOUND, SESSION_NOT_FOUND_DETAIL)
        }
        Err(e @ AskError::EmptyQuestion) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e @ AskError::GenerationTimedOut(_)) => {
            tracing::error!(error = %e, "Answer generation timed out");
            error_response(StatusCode::GATEWAY_TIMEOUT, e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "Question answering failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to get an answer: {}", e),
            )
        }
    }
}

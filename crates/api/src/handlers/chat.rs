//! Handler for the materials-science assistant.
//!
//! Each message is answered on its own; nothing from earlier messages is
//! sent to the model.

use axum::extract::State;
use axum::Json;
use matrixpert_core::error::CoreError;
use matrixpert_inference::chat::MATERIALS_EXPERT_PROMPT;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// POST /api/v1/chat
pub async fn send_message(
    State(state): State<AppState>,
    Json(input): Json<ChatRequest>,
) -> AppResult<Json<DataResponse<ChatReply>>> {
    if input.message.trim().is_empty() {
        return Err(CoreError::Validation("Message must not be empty".into()).into());
    }

    let reply = state
        .chat
        .complete(MATERIALS_EXPERT_PROMPT, &input.message)
        .await?;

    tracing::info!(reply_len = reply.len(), "Assistant replied");
    Ok(Json(DataResponse {
        data: ChatReply { reply },
    }))
}

//! Handlers for session lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use matrixpert_core::error::CoreError;
use matrixpert_core::session::SessionSummary;
use matrixpert_core::types::SessionId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<DataResponse<SessionSummary>>) {
    let session = state.sessions.create().await;
    let summary = session.lock().await.summary();
    (StatusCode::CREATED, Json(DataResponse { data: summary }))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Json<DataResponse<SessionSummary>>> {
    let session = state.sessions.require(id).await?;
    let mut context = session.lock().await;
    context.touch();
    Ok(Json(DataResponse {
        data: context.summary(),
    }))
}

/// DELETE /api/v1/sessions/{id}
///
/// Drops the session and removes its upload directory.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<StatusCode> {
    let Some(removed) = state.sessions.remove(id).await else {
        return Err(CoreError::NotFound {
            entity: "Session",
            id: id.to_string(),
        }
        .into());
    };

    // Wait out any upload still writing files for this session.
    let _context = removed.lock().await;
    if let Err(e) = state.uploads.discard(id).await {
        tracing::warn!(session_id = %id, error = %e, "Failed to remove upload directory");
    }

    Ok(StatusCode::NO_CONTENT)
}

//! Handlers for running queries and reading the history log.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use matrixpert_core::history::QueryRecord;
use matrixpert_core::selection::ImageSelection;
use matrixpert_core::types::SessionId;
use matrixpert_pipeline::query;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /sessions/{id}/queries`.
///
/// `selection` defaults to the first image (its crop if committed).
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub selection: ImageSelection,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Records added by this query.
    pub appended: Vec<QueryRecord>,
    /// The full history after the query, oldest first.
    pub history: Vec<QueryRecord>,
}

/// POST /api/v1/sessions/{id}/queries
///
/// The session stays locked for the whole model round trip, so concurrent
/// queries on one session append in arrival order.
pub async fn run_query(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<QueryRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<QueryResponse>>)> {
    let session = state.sessions.require(id).await?;
    let mut context = session.lock().await;
    context.touch();

    let outcome = query::run_query(
        &mut context,
        state.multimodal.as_ref(),
        &input.query,
        input.selection,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: QueryResponse {
                appended: outcome.appended,
                history: context.history().records().to_vec(),
            },
        }),
    ))
}

/// GET /api/v1/sessions/{id}/history
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Json<DataResponse<Vec<QueryRecord>>>> {
    let session = state.sessions.require(id).await?;
    let mut context = session.lock().await;
    context.touch();
    Ok(Json(DataResponse {
        data: context.history().records().to_vec(),
    }))
}

//! Handlers for a session's working images and their crops.
//!
//! Images arrive by multipart upload or by URL and are appended to the
//! session's working set. Originals, committed crops and uncommitted crop
//! previews are served back as PNG.

use axum::extract::{Multipart, Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use matrixpert_core::error::CoreError;
use matrixpert_core::raster::{encode_png, AcquiredImage, CropRegion};
use matrixpert_core::session::{ImageSummary, SessionContext};
use matrixpert_core::types::SessionId;
use matrixpert_pipeline::acquisition::{decode_uploads, UploadPayload};
use serde::Deserialize;
use tokio::sync::MutexGuard;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::sessions::SharedSession;
use crate::state::AppState;

fn png_response(bytes: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, "image/png")], bytes).into_response()
}

/// Append `images` and return summaries of just the new entries.
fn append(context: &mut SessionContext, images: Vec<AcquiredImage>) -> Vec<ImageSummary> {
    let first = context.add_images(images);
    context.touch();
    context.image_summaries().split_off(first)
}

/// Lock `session` and confirm it was not deleted or reaped while the
/// request was reading its body or fetching.
async fn lock_registered<'a>(
    state: &AppState,
    id: SessionId,
    session: &'a SharedSession,
) -> AppResult<MutexGuard<'a, SessionContext>> {
    let context = session.lock().await;
    if !state.sessions.is_registered(id, session).await {
        return Err(CoreError::NotFound {
            entity: "Session",
            id: id.to_string(),
        }
        .into());
    }
    Ok(context)
}

/// GET /api/v1/sessions/{id}/images
pub async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> AppResult<Json<DataResponse<Vec<ImageSummary>>>> {
    let session = state.sessions.require(id).await?;
    let mut context = session.lock().await;
    context.touch();
    Ok(Json(DataResponse {
        data: context.image_summaries(),
    }))
}

// ── Acquisition ──────────────────────────────────────────────────────

/// POST /api/v1/sessions/{id}/images/upload
///
/// Accept one or more JPEG/PNG files as multipart file fields. Every file
/// must decode or the whole upload is rejected and nothing is added.
pub async fn upload_images(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<ImageSummary>>>)> {
    let session = state.sessions.require(id).await?;

    let mut payloads = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        // Plain form fields carry no file.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        payloads.push(UploadPayload {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    if payloads.is_empty() {
        return Err(AppError::BadRequest(
            "No files received in multipart upload".to_string(),
        ));
    }

    // Decoding is CPU-bound; keep it off the async workers.
    let (payloads, decoded) = tokio::task::spawn_blocking(move || {
        let decoded = decode_uploads(&payloads);
        (payloads, decoded)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Upload decoding task failed: {e}")))?;
    let images = decoded?;

    // Persist under the session lock. Delete waits for it before discarding
    // the directory and the reaper skips locked sessions.
    let mut context = lock_registered(&state, id, &session).await?;
    state
        .uploads
        .persist(id, &payloads)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store uploads: {e}")))?;

    let added = append(&mut context, images);
    drop(context);
    tracing::info!(session_id = %id, count = added.len(), "Images uploaded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: added })))
}

/// Body for `POST /sessions/{id}/images/url`.
#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

/// POST /api/v1/sessions/{id}/images/url
pub async fn add_image_from_url(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(input): Json<UrlRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ImageSummary>>)> {
    let session = state.sessions.require(id).await?;

    if input.url.trim().is_empty() {
        return Err(CoreError::Validation("Image URL must not be empty".into()).into());
    }

    let image = state.fetcher.fetch(&input.url).await?;

    let mut context = lock_registered(&state, id, &session).await?;
    let mut added = append(&mut context, vec![image]);
    drop(context);
    let summary = added
        .pop()
        .ok_or_else(|| AppError::InternalError("Fetched image was not recorded".into()))?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: summary })))
}

// ── Rendering ────────────────────────────────────────────────────────

/// GET /api/v1/sessions/{id}/images/{index}
pub async fn get_image_png(
    State(state): State<AppState>,
    Path((id, index)): Path<(SessionId, usize)>,
) -> AppResult<Response> {
    let session = state.sessions.require(id).await?;
    let mut context = session.lock().await;
    context.touch();
    let bytes = encode_png(&context.image(index)?.raster)?;
    Ok(png_response(bytes))
}

// ── Crops ────────────────────────────────────────────────────────────

fn crop_not_found(index: usize) -> AppError {
    CoreError::NotFound {
        entity: "Crop",
        id: index.to_string(),
    }
    .into()
}

/// GET /api/v1/sessions/{id}/images/{index}/crop
pub async fn get_crop_png(
    State(state): State<AppState>,
    Path((id, index)): Path<(SessionId, usize)>,
) -> AppResult<Response> {
    let session = state.sessions.require(id).await?;
    let mut context = session.lock().await;
    context.touch();
    context.image(index)?;
    let crop = context.crop(index).ok_or_else(|| crop_not_found(index))?;
    Ok(png_response(encode_png(&crop.raster)?))
}

/// PUT /api/v1/sessions/{id}/images/{index}/crop
///
/// Commit `region` as the crop for the image, replacing any earlier crop.
pub async fn commit_crop(
    State(state): State<AppState>,
    Path((id, index)): Path<(SessionId, usize)>,
    Json(region): Json<CropRegion>,
) -> AppResult<Json<DataResponse<ImageSummary>>> {
    let session = state.sessions.require(id).await?;
    let mut context = session.lock().await;
    context.commit_crop(index, region)?;
    context.touch();
    tracing::info!(session_id = %id, index, ?region, "Crop committed");

    let summary = context
        .image_summaries()
        .into_iter()
        .nth(index)
        .ok_or_else(|| AppError::InternalError("Cropped image vanished".into()))?;
    Ok(Json(DataResponse { data: summary }))
}

/// DELETE /api/v1/sessions/{id}/images/{index}/crop
pub async fn clear_crop(
    State(state): State<AppState>,
    Path((id, index)): Path<(SessionId, usize)>,
) -> AppResult<StatusCode> {
    let session = state.sessions.require(id).await?;
    let mut context = session.lock().await;
    context.touch();
    if context.clear_crop(index)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(crop_not_found(index))
    }
}

/// POST /api/v1/sessions/{id}/images/{index}/crop/preview
///
/// Render `region` without committing it.
pub async fn preview_crop(
    State(state): State<AppState>,
    Path((id, index)): Path<(SessionId, usize)>,
    Json(region): Json<CropRegion>,
) -> AppResult<Response> {
    let session = state.sessions.require(id).await?;
    let mut context = session.lock().await;
    context.touch();
    let preview = context.preview_crop(index, region)?;
    Ok(png_response(encode_png(&preview)?))
}

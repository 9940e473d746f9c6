//! Route definitions for sessions, their working images, crops, and queries.
//!
//! Mounted at `/sessions`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{images, queries, sessions};
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// POST   /                                  -> create_session
/// GET    /{id}                              -> get_session
/// DELETE /{id}                              -> delete_session
/// GET    /{id}/images                       -> list_images
/// POST   /{id}/images/upload                -> upload_images (multipart)
/// POST   /{id}/images/url                   -> add_image_from_url
/// GET    /{id}/images/{index}               -> get_image_png
/// GET    /{id}/images/{index}/crop          -> get_crop_png
/// PUT    /{id}/images/{index}/crop          -> commit_crop
/// DELETE /{id}/images/{index}/crop          -> clear_crop
/// POST   /{id}/images/{index}/crop/preview  -> preview_crop
/// POST   /{id}/queries                      -> run_query
/// GET    /{id}/history                      -> get_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions::create_session))
        .route(
            "/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/{id}/images", get(images::list_images))
        .route("/{id}/images/upload", post(images::upload_images))
        .route("/{id}/images/url", post(images::add_image_from_url))
        .route("/{id}/images/{index}", get(images::get_image_png))
        .route(
            "/{id}/images/{index}/crop",
            get(images::get_crop_png)
                .put(images::commit_crop)
                .delete(images::clear_crop),
        )
        .route(
            "/{id}/images/{index}/crop/preview",
            post(images::preview_crop),
        )
        .route("/{id}/queries", post(queries::run_query))
        .route("/{id}/history", get(queries::get_history))
}

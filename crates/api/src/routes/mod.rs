pub mod chat;
pub mod health;
pub mod panels;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /panels                                          panel list (GET)
/// /panels/info                                     landing copy (GET)
///
/// /sessions                                        start session (POST)
/// /sessions/{id}                                   summary (GET), discard (DELETE)
/// /sessions/{id}/images                            list working images (GET)
/// /sessions/{id}/images/upload                     multipart upload (POST)
/// /sessions/{id}/images/url                        fetch by URL (POST)
/// /sessions/{id}/images/{index}                    original as PNG (GET)
/// /sessions/{id}/images/{index}/crop               crop PNG (GET), commit (PUT), clear (DELETE)
/// /sessions/{id}/images/{index}/crop/preview       uncommitted preview PNG (POST)
/// /sessions/{id}/queries                           run a query (POST)
/// /sessions/{id}/history                           query history (GET)
///
/// /chat                                            stateless assistant (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/panels", panels::router())
        .nest("/sessions", sessions::router())
        .nest("/chat", chat::router())
}

//! Mounted at `/chat`.

use axum::routing::post;
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat`.
///
/// ```text
/// POST   /        -> send_message
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(chat::send_message))
}

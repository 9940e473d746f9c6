//! Mounted at `/panels`.

use axum::routing::get;
use axum::Router;

use crate::handlers::panels;
use crate::state::AppState;

/// Routes mounted at `/panels`.
///
/// ```text
/// GET    /        -> list_panels
/// GET    /info    -> get_info
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(panels::list_panels))
        .route("/info", get(panels::get_info))
}

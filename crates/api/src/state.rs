use std::sync::Arc;

use matrixpert_inference::chat::ChatModel;
use matrixpert_inference::multimodal::MultimodalModel;
use matrixpert_pipeline::acquisition::ImageFetcher;

use crate::config::ServerConfig;
use crate::sessions::SessionStore;
use crate::uploads::UploadStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live user sessions keyed by id.
    pub sessions: Arc<SessionStore>,
    /// On-disk copies of uploaded files.
    pub uploads: Arc<UploadStore>,
    /// HTTP fetcher for images supplied by URL.
    pub fetcher: ImageFetcher,
    /// Image + text model used by the query pipeline.
    pub multimodal: Arc<dyn MultimodalModel>,
    /// Text-only model used by the assistant.
    pub chat: Arc<dyn ChatModel>,
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matrixpert_api::background::session_reaper;
use matrixpert_api::config::ServerConfig;
use matrixpert_api::router::build_app_router;
use matrixpert_api::sessions::SessionStore;
use matrixpert_api::state::AppState;
use matrixpert_api::uploads::UploadStore;
use matrixpert_inference::chat::ChatClient;
use matrixpert_inference::config::InferenceConfig;
use matrixpert_inference::multimodal::MultimodalClient;
use matrixpert_pipeline::acquisition::ImageFetcher;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "matrixpert_api=debug,matrixpert_pipeline=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let inference = InferenceConfig::from_env().expect("Invalid inference configuration");
    tracing::info!(
        multimodal_model = %inference.multimodal.model,
        chat_model = %inference.chat.model,
        "Loaded inference configuration"
    );

    // --- Model clients ---
    let multimodal =
        MultimodalClient::from_config(&inference).expect("Failed to build multimodal client");
    let chat = ChatClient::from_config(&inference).expect("Failed to build chat client");
    let fetcher = ImageFetcher::new(inference.timeout_secs.map(Duration::from_secs))
        .expect("Failed to build image fetcher")
        .with_max_bytes(config.max_upload_bytes);

    // --- Stores ---
    let sessions = Arc::new(SessionStore::new());
    let uploads = Arc::new(UploadStore::new(
        config.upload_dir.clone(),
        config.persist_uploads,
    ));
    tracing::info!(
        upload_dir = %uploads.root().display(),
        persist = uploads.is_enabled(),
        "Upload store ready"
    );

    // --- Session reaper ---
    let reaper_cancel = tokio_util::sync::CancellationToken::new();
    let reaper_handle = tokio::spawn(session_reaper::run(
        Arc::clone(&sessions),
        Arc::clone(&uploads),
        Duration::from_secs(config.session_idle_ttl_secs),
        reaper_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        sessions: Arc::clone(&sessions),
        uploads,
        fetcher,
        multimodal: Arc::new(multimodal),
        chat: Arc::new(chat),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reaper_cancel.cancel();
    let _ = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        reaper_handle,
    )
    .await;
    tracing::info!("Session reaper stopped");

    let remaining = sessions.count().await;
    tracing::info!(remaining, "Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

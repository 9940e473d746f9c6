//! Periodic discard of idle sessions.
//!
//! Sessions untouched for longer than the configured TTL are removed from
//! the store and their upload directories are deleted.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::sessions::SessionStore;
use crate::uploads::UploadStore;

/// How often the reaper runs.
pub const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Remove sessions idle for longer than `ttl` and delete their uploads.
///
/// Returns the number of sessions removed.
pub async fn reap_idle(sessions: &SessionStore, uploads: &UploadStore, ttl: Duration) -> usize {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
    let cutoff = Utc::now()
        .checked_sub_signed(ttl)
        .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);

    let removed = sessions.remove_idle(cutoff).await;
    for id in &removed {
        if let Err(e) = uploads.discard(*id).await {
            tracing::warn!(session_id = %id, error = %e, "Session reaper: failed to remove uploads");
        }
    }
    removed.len()
}

/// Run the session reaper loop until `cancel` is triggered.
pub async fn run(
    sessions: Arc<SessionStore>,
    uploads: Arc<UploadStore>,
    ttl: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        ttl_secs = ttl.as_secs(),
        interval_secs = REAP_INTERVAL.as_secs(),
        "Session reaper started"
    );

    let mut interval = tokio::time::interval(REAP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session reaper stopping");
                break;
            }
            _ = interval.tick() => {
                let removed = reap_idle(&sessions, &uploads, ttl).await;
                if removed > 0 {
                    tracing::info!(removed, "Session reaper: discarded idle sessions");
                } else {
                    tracing::debug!("Session reaper: no idle sessions");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrixpert_pipeline::acquisition::UploadPayload;

    #[tokio::test]
    async fn zero_ttl_reaps_sessions_and_their_uploads() {
        let tmp = tempfile::tempdir().unwrap();
        let sessions = SessionStore::new();
        let uploads = UploadStore::new(tmp.path(), true);

        let session = sessions.create().await;
        let id = session.lock().await.id();
        uploads
            .persist(
                id,
                &[UploadPayload {
                    filename: "a.png".into(),
                    content_type: None,
                    bytes: vec![1, 2, 3],
                }],
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let removed = reap_idle(&sessions, &uploads, Duration::ZERO).await;

        assert_eq!(removed, 1);
        assert_eq!(sessions.count().await, 0);
        assert!(!uploads.session_dir(id).exists());
    }

    #[tokio::test]
    async fn long_ttl_keeps_sessions() {
        let tmp = tempfile::tempdir().unwrap();
        let sessions = SessionStore::new();
        let uploads = UploadStore::new(tmp.path(), true);
        sessions.create().await;

        let removed = reap_idle(&sessions, &uploads, Duration::from_secs(3600)).await;

        assert_eq!(removed, 0);
        assert_eq!(sessions.count().await, 1);
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            Arc::new(SessionStore::new()),
            Arc::new(UploadStore::new("unused", false)),
            Duration::from_secs(60),
            cancel.clone(),
        ));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}

//! In-memory registry of live sessions.
//!
//! Each session sits behind its own [`tokio::sync::Mutex`], so requests for
//! one session are serialised while different sessions proceed in parallel.
//! The outer [`RwLock`] is only held long enough to look up or insert an
//! entry.

use std::collections::HashMap;
use std::sync::Arc;

use matrixpert_core::error::CoreError;
use matrixpert_core::session::SessionContext;
use matrixpert_core::types::{SessionId, Timestamp};
use tokio::sync::{Mutex, RwLock};

/// A session shared between concurrent requests.
pub type SharedSession = Arc<Mutex<SessionContext>>;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty session.
    pub async fn create(&self) -> SharedSession {
        let context = SessionContext::new();
        let id = context.id();
        let shared = Arc::new(Mutex::new(context));
        self.sessions.write().await.insert(id, Arc::clone(&shared));
        tracing::info!(session_id = %id, "Session created");
        shared
    }

    pub async fn get(&self, id: SessionId) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Like [`get`](Self::get) but maps a miss to `CoreError::NotFound`.
    pub async fn require(&self, id: SessionId) -> Result<SharedSession, CoreError> {
        self.get(id).await.ok_or_else(|| CoreError::NotFound {
            entity: "Session",
            id: id.to_string(),
        })
    }

    pub async fn remove(&self, id: SessionId) -> Option<SharedSession> {
        let removed = self.sessions.write().await.remove(&id);
        if removed.is_some() {
            tracing::info!(session_id = %id, "Session discarded");
        }
        removed
    }

    /// Whether `session` is still the entry registered under `id`.
    ///
    /// Callers holding the session lock use this to detect a concurrent
    /// delete or reap that removed the entry while they waited.
    pub async fn is_registered(&self, id: SessionId, session: &SharedSession) -> bool {
        self.sessions
            .read()
            .await
            .get(&id)
            .is_some_and(|current| Arc::ptr_eq(current, session))
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove every session whose last activity is before `cutoff`.
    ///
    /// Sessions currently locked by a request are in use and are skipped.
    /// Returns the ids that were removed.
    pub async fn remove_idle(&self, cutoff: Timestamp) -> Vec<SessionId> {
        let mut sessions = self.sessions.write().await;
        let idle: Vec<SessionId> = sessions
            .iter()
            .filter_map(|(id, shared)| {
                let context = shared.try_lock().ok()?;
                (context.last_active_at() < cutoff).then_some(*id)
            })
            .collect();

        for id in &idle {
            sessions.remove(id);
        }
        idle
    }
}

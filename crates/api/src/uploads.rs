//! On-disk copies of uploaded files, one directory per session.
//!
//! Layout: `{root}/{session_id}/{sanitised filename}`. A later upload with
//! the same name in the same session overwrites the earlier file. The
//! directory is removed when the session is discarded or reaped.

use std::io;
use std::path::{Path, PathBuf};

use matrixpert_core::naming::sanitize_upload_name;
use matrixpert_core::types::SessionId;
use matrixpert_pipeline::acquisition::UploadPayload;

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    enabled: bool,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            root: root.into(),
            enabled,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn session_dir(&self, session_id: SessionId) -> PathBuf {
        self.root.join(session_id.to_string())
    }

    /// Write every payload into the session's directory.
    ///
    /// Returns the written paths, or an empty list when persistence is off.
    pub async fn persist(
        &self,
        session_id: SessionId,
        payloads: &[UploadPayload],
    ) -> io::Result<Vec<PathBuf>> {
        if !self.enabled || payloads.is_empty() {
            return Ok(Vec::new());
        }

        let dir = self.session_dir(session_id);
        tokio::fs::create_dir_all(&dir).await?;

        let mut written = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let dest = dir.join(sanitize_upload_name(&payload.filename));
            tokio::fs::write(&dest, &payload.bytes).await?;
            written.push(dest);
        }

        tracing::debug!(
            %session_id,
            files = written.len(),
            dir = %dir.display(),
            "Persisted uploads"
        );
        Ok(written)
    }

    /// Delete the session's directory. A missing directory is not an error.
    pub async fn discard(&self, session_id: SessionId) -> io::Result<()> {
        match tokio::fs::remove_dir_all(self.session_dir(session_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

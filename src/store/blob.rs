use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::WardenError;

/// Filesystem blob tier holding full result and error payloads as
/// pretty-printed JSON, keyed by relative path.
#[derive(Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: &str) -> Self {
        let store = Self { root: PathBuf::from(root) };
        store.ensure_exists();
        store
    }

    /// Create the root directory if missing. Best-effort: a failure here is
    /// logged and surfaces later as a write error instead.
    fn ensure_exists(&self) {
        match std::fs::create_dir_all(&self.root) {
            Ok(()) => debug!(root = %self.root.display(), "Blob store root ready"),
            Err(e) => warn!(root = %self.root.display(), error = %e, "Error ensuring blob store root exists"),
        }
    }

    pub async fn put_json<T: Serialize>(
        &self,
        relative_path: &str,
        payload: &T,
    ) -> Result<(), WardenError> {
        let path = self.root.join(relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WardenError::Storage(format!("Failed to create blob dir: {}", e)))?;
        }

        let body = serde_json::to_string_pretty(payload)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| WardenError::Storage(format!("Failed to write blob {}: {}", relative_path, e)))?;

        info!(path = %relative_path, "Saved blob");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

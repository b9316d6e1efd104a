pub mod blob;
pub mod metadata;
pub mod schema;

pub use blob::BlobStore;
pub use metadata::Database;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::errors::WardenError;
use crate::models::{ErrorRecord, ScanRecord};
use crate::utils::sanitize_name;

/// Two-tier result store: full payloads go to the blob tier, a compact
/// denormalized record goes to the queryable metadata tier. Both tiers key
/// on the same sanitized image name.
#[derive(Clone)]
pub struct ResultStore {
    blob: BlobStore,
    db: Database,
    cache_window_hours: i64,
}

impl ResultStore {
    pub fn new(config: &Config) -> Result<Self, WardenError> {
        Ok(Self {
            blob: BlobStore::new(&config.results_dir),
            db: Database::new(&config.db_path)?,
            cache_window_hours: config.cache_window_hours,
        })
    }

    /// In-memory metadata tier with a caller-supplied blob root. Used by
    /// tests and ad-hoc scans that should not touch the configured database.
    pub fn in_memory(results_dir: &str, cache_window_hours: i64) -> Result<Self, WardenError> {
        Ok(Self {
            blob: BlobStore::new(results_dir),
            db: Database::in_memory()?,
            cache_window_hours,
        })
    }

    /// Persist a scan: blob write first, then the metadata row pointing at
    /// it. Failures propagate and abort that image's processing.
    pub async fn save_scan_result(&self, record: &ScanRecord) -> Result<String, WardenError> {
        let blob_path = format!("{}/{}.json", sanitize_name(&record.image), record.scan_id);
        self.blob.put_json(&blob_path, record).await?;
        self.db.insert_record(record, &blob_path)?;
        info!(scan_id = %record.scan_id, path = %blob_path, "Saved scan record");
        Ok(blob_path)
    }

    /// Persist a per-image failure. Best-effort: a failure to record the
    /// error is logged, never propagated.
    pub async fn save_error(&self, record: &ErrorRecord) {
        let blob_path = format!(
            "errors/{}/{}.json",
            sanitize_name(&record.image),
            record.timestamp
        );
        match self.blob.put_json(&blob_path, record).await {
            Ok(()) => info!(path = %blob_path, "Saved error record"),
            Err(e) => error!(error = %e, "Error saving error record"),
        }
    }

    /// Recency cache check. Fail-open: any storage error during the query is
    /// treated as "not recently scanned" so a storage outage never blocks
    /// scanning.
    pub fn is_recently_scanned(&self, image: &str) -> bool {
        let cutoff = (Utc::now() - Duration::hours(self.cache_window_hours)).to_rfc3339();
        match self.db.recent_scan_exists(&sanitize_name(image), &cutoff) {
            Ok(found) => {
                if found {
                    info!(image = %image, "Found recent scan");
                }
                found
            }
            Err(e) => {
                warn!(image = %image, error = %e, "Error checking recent scans");
                false
            }
        }
    }

    pub fn list_records(&self, limit: usize) -> Result<Vec<serde_json::Value>, WardenError> {
        self.db.list_records(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComplianceSummary, ScanStatus, ServiceLabels, VulnerabilitySummary};

    fn record(scan_id: &str, image: &str) -> ScanRecord {
        ScanRecord {
            timestamp: Utc::now().to_rfc3339(),
            container_type: "cloudrun".to_string(),
            image: image.to_string(),
            service: ServiceLabels::default(),
            scan_id: scan_id.to_string(),
            status: ScanStatus::Completed,
            vulnerabilities: VulnerabilitySummary::default(),
            compliance: ComplianceSummary::default(),
        }
    }

    #[tokio::test]
    async fn test_save_scan_result_writes_both_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::in_memory(dir.path().to_str().unwrap(), 24).unwrap();

        let blob_path = store
            .save_scan_result(&record("s1", "docker.io/library/nginx:latest"))
            .await
            .unwrap();
        assert_eq!(blob_path, "docker.io_library_nginx_latest/s1.json");
        assert!(dir.path().join(&blob_path).exists());
        assert_eq!(store.list_records(10).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recently_scanned_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::in_memory(dir.path().to_str().unwrap(), 24).unwrap();

        assert!(!store.is_recently_scanned("docker.io/library/nginx:latest"));
        store
            .save_scan_result(&record("s1", "docker.io/library/nginx:latest"))
            .await
            .unwrap();
        assert!(store.is_recently_scanned("docker.io/library/nginx:latest"));
        assert!(!store.is_recently_scanned("docker.io/library/redis:latest"));
    }

    #[tokio::test]
    async fn test_old_scan_outside_window() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::in_memory(dir.path().to_str().unwrap(), 24).unwrap();

        let mut old = record("s1", "nginx");
        old.timestamp = (Utc::now() - Duration::hours(48)).to_rfc3339();
        store.save_scan_result(&old).await.unwrap();
        assert!(!store.is_recently_scanned("nginx"));
    }

    #[tokio::test]
    async fn test_save_error_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::in_memory(dir.path().to_str().unwrap(), 24).unwrap();

        let err = ErrorRecord::new("nginx", "boom", ServiceLabels::default());
        store.save_error(&err).await;

        let errors_dir = dir.path().join("errors/nginx");
        assert!(errors_dir.exists());
        assert_eq!(std::fs::read_dir(errors_dir).unwrap().count(), 1);
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::envelope::EventEnvelope;
use crate::alert::{self, AlertSink};
use crate::config::Config;
use crate::errors::WardenError;
use crate::executor::{JobExecutor, ScanOrchestrator};
use crate::image::ImageReference;
use crate::models::{ErrorRecord, ScanRecord, ScanResult, ServiceLabels};
use crate::store::ResultStore;

/// Sequences the full per-event workflow: decode, filter, and for each
/// image parse -> recency check -> orchestrate -> persist -> alert. Holds
/// no state between events.
pub struct Processor {
    config: Arc<Config>,
    store: ResultStore,
    orchestrator: ScanOrchestrator,
    alerts: Arc<dyn AlertSink>,
}

impl Processor {
    pub fn new(
        config: Arc<Config>,
        store: ResultStore,
        executor: Arc<dyn JobExecutor>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let orchestrator = ScanOrchestrator::new(executor, config.clone());
        Self { config, store, orchestrator, alerts }
    }

    /// Process one inbound event. Returns the number of images scanned.
    /// Per-image failures are recorded and skipped; decode failures
    /// propagate to the invoking runtime for its retry policy.
    pub async fn process_event(&self, envelope: &EventEnvelope) -> Result<usize, WardenError> {
        let event_id = envelope
            .event_id()
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        info!(event_id = %event_id, "Processing deployment event");

        let Some(entry) = envelope.decode()? else {
            warn!("No data in event envelope");
            return Ok(0);
        };

        let method = &entry.proto_payload.method_name;
        if !entry.is_deployment_event() {
            info!(method = %method, "Ignoring non-deployment event");
            return Ok(0);
        }

        let labels = entry.service_labels();
        info!(
            service = ?labels.service_name,
            location = ?labels.location,
            "Deployment event for service"
        );

        let images = entry.images();
        if images.is_empty() {
            warn!("No container images found in service definition");
            return Ok(0);
        }
        info!(count = images.len(), "Found container images to scan");

        let mut processed = 0;
        for image in &images {
            match self.scan_one(image, &labels, &event_id).await {
                Ok(Some(_)) => processed += 1,
                Ok(None) => {} // cache hit
                Err(e) => {
                    error!(image = %image, error = %e, "Error processing image");
                    let record = ErrorRecord::new(image, &e.to_string(), labels.clone());
                    self.store.save_error(&record).await;
                }
            }
        }

        info!(processed, "Finished processing event");
        Ok(processed)
    }

    /// Scan a single image reference. `Ok(None)` means the recency cache
    /// suppressed the scan.
    pub async fn scan_one(
        &self,
        raw_image: &str,
        labels: &ServiceLabels,
        event_id: &str,
    ) -> Result<Option<ScanRecord>, WardenError> {
        info!(image = %raw_image, "Processing image");
        let image = ImageReference::parse(raw_image);

        if self.store.is_recently_scanned(&image.full_name) {
            info!(image = %image.full_name, "Image was recently scanned, skipping");
            return Ok(None);
        }

        let tags = self.tracking_tags(labels, event_id);
        let result = self.orchestrator.scan_image(&image, &tags).await?;
        let record = self.build_record(&image, result, labels);

        self.store.save_scan_result(&record).await?;

        if alert::should_alert(self.config.alert_threshold, &record) {
            self.alerts.publish_best_effort(&record).await;
        }

        Ok(Some(record))
    }

    /// Tracking tags forwarded into the scanner invocation.
    fn tracking_tags(&self, labels: &ServiceLabels, event_id: &str) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("container_type".to_string(), self.config.container_type.clone());
        tags.insert("event_id".to_string(), event_id.to_string());
        if let Some(project) = &labels.project_id {
            tags.insert("project".to_string(), project.clone());
        }
        if let Some(service) = &labels.service_name {
            tags.insert("service_name".to_string(), service.clone());
        }
        if let Some(location) = &labels.location {
            tags.insert("location".to_string(), location.clone());
        }
        tags
    }

    fn build_record(
        &self,
        image: &ImageReference,
        result: ScanResult,
        labels: &ServiceLabels,
    ) -> ScanRecord {
        ScanRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            container_type: self.config.container_type.clone(),
            image: image.full_name.clone(),
            service: labels.clone(),
            scan_id: result.scan_id,
            status: result.status,
            vulnerabilities: result.vulnerabilities,
            compliance: result.compliance,
        }
    }
}

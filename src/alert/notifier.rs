use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use crate::errors::WardenError;
use crate::models::ScanRecord;

/// Outbound alert channel. Implementations may fail; callers go through
/// [`AlertSink::publish_best_effort`] so a broken channel never aborts
/// event processing.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn publish(&self, record: &ScanRecord) -> Result<(), WardenError>;

    /// Attempt-and-log wrapper: failures are visible in the logs but are
    /// always swallowed.
    async fn publish_best_effort(&self, record: &ScanRecord) {
        warn!(
            image = %record.image,
            service = ?record.service.service_name,
            critical = record.vulnerabilities.critical,
            high = record.vulnerabilities.high,
            "SECURITY ALERT: high severity vulnerabilities found"
        );

        if let Err(e) = self.publish(record).await {
            error!(error = %e, "Error sending alert");
        }
    }
}

/// Publishes alert payloads to a configured webhook URL. With no URL
/// configured the publish is a no-op.
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self { client: reqwest::Client::new(), webhook_url }
    }
}

#[async_trait]
impl AlertSink for WebhookNotifier {
    async fn publish(&self, record: &ScanRecord) -> Result<(), WardenError> {
        let Some(url) = &self.webhook_url else {
            return Ok(());
        };

        let payload = json!({
            "severity": "HIGH",
            "image": record.image,
            "service": record.service.service_name,
            "vulnerabilities": record.vulnerabilities,
            "timestamp": record.timestamp,
        });

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WardenError::Alert(format!("Webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(WardenError::Alert(format!(
                "Webhook returned status {}",
                response.status()
            )));
        }

        info!(url = %url, "Alert published");
        Ok(())
    }
}

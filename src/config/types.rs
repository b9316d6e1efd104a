use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::WardenError;

/// Minimum severity that triggers an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertThreshold {
    /// Alert only when critical findings are present.
    Critical,
    /// Alert when critical or high findings are present.
    #[default]
    High,
}

impl AlertThreshold {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
        }
    }

    fn parse(value: &str) -> Result<Self, WardenError> {
        match value.to_uppercase().as_str() {
            "CRITICAL" => Ok(Self::Critical),
            "HIGH" => Ok(Self::High),
            other => Err(WardenError::Config(format!(
                "Invalid NOTIFY_SEVERITY_THRESHOLD '{}', expected CRITICAL or HIGH",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AlertThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide configuration, built once at startup and passed by reference
/// into each component. Component logic never reads the environment directly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project identifier stamped onto records and scanner tracking tags.
    pub project_id: String,
    /// Region label carried into records.
    pub region: String,
    /// Root directory of the blob tier (full result payloads).
    pub results_dir: String,
    /// Path of the SQLite metadata store.
    pub db_path: String,
    /// Scanner container image reference.
    pub scanner_image: String,
    /// Scanner backend pod identifier passed to the scanner invocation.
    pub scanner_pod: Option<String>,
    /// Scanner access token injected into the job environment.
    pub scanner_access_token: Option<String>,
    /// Optional service identity label attached to scan jobs.
    pub service_account: Option<String>,
    /// Hard wall-clock budget for one scan job.
    pub scan_timeout: Duration,
    /// Interval between execution status checks.
    pub poll_interval: Duration,
    /// Recency-cache window: skip images scanned within this many hours.
    pub cache_window_hours: i64,
    /// Minimum severity triggering an alert.
    pub alert_threshold: AlertThreshold,
    /// Alert webhook URL; alerts are a no-op when unset.
    pub webhook_url: Option<String>,
    /// Deployment kind label stamped onto records ("cloudrun" style).
    pub container_type: String,
}

impl Config {
    pub fn from_env() -> Result<Self, WardenError> {
        let project_id = std::env::var("WARDEN_PROJECT_ID")
            .map_err(|_| WardenError::Config("WARDEN_PROJECT_ID is required".into()))?;

        let scan_timeout_secs = env_parse("SCAN_TIMEOUT", 1800u64)?;
        let poll_interval_secs = env_parse("SCAN_POLL_INTERVAL", 10u64)?;
        let cache_window_hours = env_parse("SCAN_CACHE_HOURS", 24i64)?;

        let alert_threshold = match std::env::var("NOTIFY_SEVERITY_THRESHOLD") {
            Ok(value) => AlertThreshold::parse(&value)?,
            Err(_) => AlertThreshold::default(),
        };

        Ok(Self {
            project_id,
            region: std::env::var("WARDEN_REGION").unwrap_or_else(|_| "us-central1".to_string()),
            results_dir: std::env::var("WARDEN_RESULTS_DIR")
                .unwrap_or_else(|_| "./data/results".to_string()),
            db_path: std::env::var("WARDEN_DB_PATH")
                .unwrap_or_else(|_| "./data/scanwarden.db".to_string()),
            scanner_image: std::env::var("SCANNER_IMAGE")
                .unwrap_or_else(|_| "qualys/qscanner:latest".to_string()),
            scanner_pod: std::env::var("SCANNER_POD").ok(),
            scanner_access_token: std::env::var("SCANNER_ACCESS_TOKEN").ok(),
            service_account: std::env::var("SCAN_SERVICE_ACCOUNT").ok(),
            scan_timeout: Duration::from_secs(scan_timeout_secs),
            poll_interval: Duration::from_secs(poll_interval_secs),
            cache_window_hours,
            alert_threshold,
            webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok(),
            container_type: std::env::var("WARDEN_CONTAINER_TYPE")
                .unwrap_or_else(|_| "cloudrun".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: "unknown".to_string(),
            region: "us-central1".to_string(),
            results_dir: "./data/results".to_string(),
            db_path: "./data/scanwarden.db".to_string(),
            scanner_image: "qualys/qscanner:latest".to_string(),
            scanner_pod: None,
            scanner_access_token: None,
            service_account: None,
            scan_timeout: Duration::from_secs(1800),
            poll_interval: Duration::from_secs(10),
            cache_window_hours: 24,
            alert_threshold: AlertThreshold::default(),
            webhook_url: None,
            container_type: "cloudrun".to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, WardenError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| WardenError::Config(format!("Invalid {}: '{}'", key, value))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_threshold_default() {
        assert_eq!(AlertThreshold::default(), AlertThreshold::High);
    }

    #[test]
    fn test_alert_threshold_parse() {
        assert_eq!(AlertThreshold::parse("critical").unwrap(), AlertThreshold::Critical);
        assert_eq!(AlertThreshold::parse("HIGH").unwrap(), AlertThreshold::High);
        assert!(AlertThreshold::parse("MEDIUM").is_err());
    }

    #[test]
    fn test_alert_threshold_display() {
        assert_eq!(format!("{}", AlertThreshold::Critical), "CRITICAL");
        assert_eq!(format!("{}", AlertThreshold::High), "HIGH");
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.scan_timeout, Duration::from_secs(1800));
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.cache_window_hours, 24);
        assert_eq!(config.alert_threshold, AlertThreshold::High);
        assert!(config.webhook_url.is_none());
    }
}

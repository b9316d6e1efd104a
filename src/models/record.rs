use serde::{Deserialize, Serialize};

use super::result::{ComplianceSummary, ScanStatus, VulnerabilitySummary};

/// Labels identifying the deployed service an image belongs to, extracted
/// from the audit event's resource labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceLabels {
    pub project_id: Option<String>,
    pub service_name: Option<String>,
    pub location: Option<String>,
}

/// Denormalized projection of one scan, written once per scan and never
/// updated. The full payload lives in the blob tier; this record duplicates
/// the severity counts for querying and carries the recency-cache key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub timestamp: String,
    pub container_type: String,
    pub image: String,
    #[serde(flatten)]
    pub service: ServiceLabels,
    pub scan_id: String,
    pub status: ScanStatus,
    pub vulnerabilities: VulnerabilitySummary,
    pub compliance: ComplianceSummary,
}

/// Per-image failure record, independent of the ScanRecord lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: String,
    pub image: String,
    pub error: String,
    #[serde(flatten)]
    pub service: ServiceLabels,
}

impl ErrorRecord {
    pub fn new(image: &str, error: &str, service: ServiceLabels) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            image: image.to_string(),
            error: error.to_string(),
            service,
        }
    }
}

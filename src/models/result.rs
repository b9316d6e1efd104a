use serde::{Deserialize, Serialize};

use super::severity::Severity;
use crate::image::ImageReference;

/// Outcome classification of one scan attempt's output interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanStatus {
    Completed,
    ParseError,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::ParseError => "PARSE_ERROR",
        }
    }
}

/// One normalized vulnerability finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnDetail {
    pub qid: Option<String>,
    pub cve: Option<String>,
    pub severity: Severity,
    pub title: Option<String>,
    pub package: Option<String>,
    pub version: Option<String>,
    pub fixed_version: Option<String>,
}

/// Per-severity counts plus the ordered finding details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnerabilitySummary {
    #[serde(rename = "CRITICAL")]
    pub critical: u32,
    #[serde(rename = "HIGH")]
    pub high: u32,
    #[serde(rename = "MEDIUM")]
    pub medium: u32,
    #[serde(rename = "LOW")]
    pub low: u32,
    #[serde(rename = "INFORMATIONAL")]
    pub informational: u32,
    pub total: u32,
    pub details: Vec<VulnDetail>,
}

impl VulnerabilitySummary {
    pub fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Informational => self.informational += 1,
        }
        self.total += 1;
    }
}

/// One normalized compliance check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: String,
    pub description: Option<String>,
}

/// Pass/fail counts plus the ordered check list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub passed: u32,
    pub failed: u32,
    pub total: u32,
    pub checks: Vec<ComplianceCheck>,
}

/// Scan provenance carried alongside the summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub registry: String,
    pub repository: String,
    pub tag: String,
    pub digest: Option<String>,
    pub scan_timestamp: String,
    pub scanner: String,
    pub job_name: String,
}

/// The normalized result of one image scan. Built once by the result
/// interpreter and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: String,
    pub status: ScanStatus,
    pub image: String,
    pub vulnerabilities: VulnerabilitySummary,
    pub compliance: ComplianceSummary,
    pub metadata: ScanMetadata,
    /// Raw scanner text plus decode error, retained when status is ParseError.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<ParseFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseFailure {
    pub error: String,
    pub raw_output: String,
}

impl ScanMetadata {
    pub fn for_image(image: &ImageReference, job_name: &str) -> Self {
        Self {
            registry: image.registry.clone(),
            repository: image.repository.clone(),
            tag: image.tag.clone(),
            digest: image.digest.clone(),
            scan_timestamp: chrono::Utc::now().to_rfc3339(),
            scanner: "scanwarden-job".to_string(),
            job_name: job_name.to_string(),
        }
    }
}

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::Config;
use crate::image::ImageReference;

/// Base portion of a job name is truncated to this length so the full name
/// with its `-<14-digit timestamp>` suffix stays within the platform's
/// 63-character limit.
const MAX_BASE_LEN: usize = 48;

/// Everything the executor needs to run one scan job. Created per scan
/// attempt and discarded after job teardown.
#[derive(Debug, Clone)]
pub struct ScanJobSpec {
    /// Unique, sanitized job name.
    pub job_name: String,
    /// Image identifier the scanner is pointed at.
    pub image_id: String,
    /// Container image the scanner itself runs as.
    pub scanner_image: String,
    /// Scanner invocation, joined with `/bin/sh -c`.
    pub command: Vec<String>,
    /// Environment passed to the scanner container (credentials).
    pub env: Vec<(String, String)>,
    /// Labels marking the job as managed by this system.
    pub labels: BTreeMap<String, String>,
    /// Optional service identity the job runs as.
    pub service_account: Option<String>,
    /// Hard execution budget for the job itself.
    pub timeout: Duration,
}

impl ScanJobSpec {
    pub fn build(
        config: &Config,
        image: &ImageReference,
        custom_tags: &BTreeMap<String, String>,
    ) -> Self {
        let job_name = generate_job_name(&image.repository, &image.tag);

        let mut command = vec![
            "qscanner".to_string(),
            "image".to_string(),
            image.full_name.clone(),
        ];
        if let Some(pod) = &config.scanner_pod {
            command.push("--pod".to_string());
            command.push(pod.clone());
        }
        command.push("--output-format".to_string());
        command.push("json".to_string());
        for (key, value) in custom_tags {
            command.push("--tag".to_string());
            command.push(format!("{}={}", key, value));
        }

        let mut env = Vec::new();
        if let Some(token) = &config.scanner_access_token {
            env.push(("QUALYS_ACCESS_TOKEN".to_string(), token.clone()));
        }

        let mut labels = BTreeMap::new();
        labels.insert("purpose".to_string(), "image-scan".to_string());
        labels.insert("managed-by".to_string(), "scanwarden".to_string());

        Self {
            job_name,
            image_id: image.full_name.clone(),
            scanner_image: config.scanner_image.clone(),
            command,
            env,
            labels,
            service_account: config.service_account.clone(),
            timeout: config.scan_timeout,
        }
    }
}

/// Derive a unique job name from repository and tag. Job names must be
/// lowercase alphanumeric with hyphens, at most 63 characters, and end with
/// a UTC timestamp suffix for uniqueness across attempts.
pub fn generate_job_name(repository: &str, tag: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S");

    let base: String = format!("scan-{}-{}", repository.replace('/', "-"), tag)
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    let base = if base.len() > MAX_BASE_LEN { &base[..MAX_BASE_LEN] } else { &base };

    format!("{}-{}", base, timestamp)
}

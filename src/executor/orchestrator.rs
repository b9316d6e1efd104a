use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::{JobExecutor, ScanJobSpec};
use crate::config::Config;
use crate::errors::WardenError;
use crate::image::ImageReference;
use crate::models::ScanResult;
use crate::report;

/// Drives one scan job from creation through log retrieval and teardown.
/// Single attempt, no retries: the job is uniquely named per attempt, so a
/// failed scan is simply recorded and the next event tries again.
pub struct ScanOrchestrator {
    executor: Arc<dyn JobExecutor>,
    config: Arc<Config>,
}

impl ScanOrchestrator {
    pub fn new(executor: Arc<dyn JobExecutor>, config: Arc<Config>) -> Self {
        Self { executor, config }
    }

    /// Scan one image: create job -> run -> poll until completion -> fetch
    /// logs -> interpret. The job resource is deleted best-effort in every
    /// path, success or failure.
    pub async fn scan_image(
        &self,
        image: &ImageReference,
        custom_tags: &BTreeMap<String, String>,
    ) -> Result<ScanResult, WardenError> {
        info!(image = %image.full_name, "Scanning image");

        let spec = ScanJobSpec::build(&self.config, image, custom_tags);
        let job_name = spec.job_name.clone();

        let outcome = self.run_to_logs(&spec).await;

        // Cleanup runs regardless of outcome; its failure is logged, never
        // escalated.
        if let Err(e) = self.executor.delete_job(&job_name).await {
            warn!(job = %job_name, error = %e, "Failed to delete job");
        }

        let logs = outcome?;
        Ok(report::interpret(&logs, image, &job_name))
    }

    async fn run_to_logs(&self, spec: &ScanJobSpec) -> Result<String, WardenError> {
        self.executor.create_job(spec).await?;
        let execution = self.executor.run_job(&spec.job_name).await?;
        self.wait_for_completion(&execution).await?;
        self.executor.fetch_logs(&execution).await
    }

    /// Poll execution status until a completion marker appears or the scan
    /// timeout elapses. A transient status-check failure is logged and
    /// polling continues; only the timeout aborts the loop.
    async fn wait_for_completion(&self, execution: &str) -> Result<(), WardenError> {
        let start = Instant::now();
        info!(execution = %execution, "Waiting for execution to complete");

        loop {
            if start.elapsed() > self.config.scan_timeout {
                return Err(WardenError::Timeout(format!(
                    "Execution {} timed out after {} seconds",
                    execution,
                    self.config.scan_timeout.as_secs()
                )));
            }

            match self.executor.execution_status(execution).await {
                Ok(status) if status.completed => {
                    if status.succeeded > 0 {
                        info!(execution = %execution, "Execution succeeded");
                        return Ok(());
                    }
                    if status.failed > 0 {
                        // The scanner exits non-zero when it finds
                        // vulnerabilities; that is still a usable result.
                        warn!(execution = %execution, "Execution had failures, proceeding to logs");
                        return Ok(());
                    }
                    return Err(WardenError::UnexpectedState(format!(
                        "Execution {} completed with no task outcome",
                        execution
                    )));
                }
                Ok(_) => {}
                Err(e) => {
                    error!(execution = %execution, error = %e, "Error checking execution status");
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

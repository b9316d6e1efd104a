pub mod docker;
pub mod orchestrator;
pub mod spec;

pub use docker::DockerExecutor;
pub use orchestrator::ScanOrchestrator;
pub use spec::{generate_job_name, ScanJobSpec};

use async_trait::async_trait;

use crate::errors::WardenError;

/// Snapshot of one job execution's progress. Counts stay zero until the
/// executor reports task outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionStatus {
    /// Completion marker: the execution has finished, successfully or not.
    pub completed: bool,
    pub succeeded: u32,
    pub failed: u32,
}

/// The managed job-runner surface the orchestrator drives. One scan maps to
/// create -> run -> poll status -> fetch logs -> delete.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn create_job(&self, spec: &ScanJobSpec) -> Result<(), WardenError>;

    /// Start the created job; returns an execution handle.
    async fn run_job(&self, job_name: &str) -> Result<String, WardenError>;

    async fn execution_status(&self, execution: &str) -> Result<ExecutionStatus, WardenError>;

    /// Retrieve the execution's output as an opaque text blob.
    async fn fetch_logs(&self, execution: &str) -> Result<String, WardenError>;

    async fn delete_job(&self, job_name: &str) -> Result<(), WardenError>;
}

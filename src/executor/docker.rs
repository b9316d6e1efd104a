use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, LogsOptions, RemoveContainerOptions,
    StartContainerOptions,
};
use bollard::models::{ContainerStateStatusEnum, HostConfig};
use bollard::Docker;
use futures::StreamExt;
use std::collections::HashMap;
use tracing::{debug, info};

use super::{ExecutionStatus, JobExecutor, ScanJobSpec};
use crate::errors::WardenError;

/// Docker-backed job executor. Each scan job is a single-run container:
/// create = job creation, start = run, inspect = execution status, logs =
/// log retrieval, remove = job deletion.
pub struct DockerExecutor {
    docker: Docker,
}

impl DockerExecutor {
    pub fn new() -> Result<Self, WardenError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl JobExecutor for DockerExecutor {
    async fn create_job(&self, spec: &ScanJobSpec) -> Result<(), WardenError> {
        info!(job = %spec.job_name, image = %spec.image_id, "Creating scan job");

        let mut labels: HashMap<String, String> =
            spec.labels.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        if let Some(account) = &spec.service_account {
            labels.insert("service-account".to_string(), account.clone());
        }

        let env: Vec<String> =
            spec.env.iter().map(|(k, v)| format!("{}={}", k, v)).collect();

        // Resource limits mirror the managed-runner defaults: 1 CPU, 2 GiB.
        let host_config = HostConfig {
            nano_cpus: Some(1_000_000_000),
            memory: Some(2 * 1024 * 1024 * 1024),
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.scanner_image.clone()),
            cmd: Some(vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                spec.command.join(" "),
            ]),
            env: Some(env),
            labels: Some(labels),
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: spec.job_name.as_str(),
            platform: None,
        };

        self.docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| WardenError::Executor(format!("Failed to create job: {}", e)))?;

        info!(job = %spec.job_name, "Job created");
        Ok(())
    }

    async fn run_job(&self, job_name: &str) -> Result<String, WardenError> {
        self.docker
            .start_container(job_name, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| WardenError::Executor(format!("Failed to run job: {}", e)))?;

        info!(job = %job_name, "Job execution started");
        // The container itself is the execution; its name is the handle.
        Ok(job_name.to_string())
    }

    async fn execution_status(&self, execution: &str) -> Result<ExecutionStatus, WardenError> {
        let inspect = self
            .docker
            .inspect_container(execution, None::<InspectContainerOptions>)
            .await
            .map_err(|e| WardenError::Executor(format!("Failed to check execution status: {}", e)))?;

        let state = inspect
            .state
            .ok_or_else(|| WardenError::Executor("Execution has no state".into()))?;

        let completed = matches!(
            state.status,
            Some(ContainerStateStatusEnum::EXITED) | Some(ContainerStateStatusEnum::DEAD)
        );

        let mut status = ExecutionStatus { completed, ..Default::default() };
        if completed {
            match state.exit_code {
                Some(0) => status.succeeded = 1,
                Some(_) => status.failed = 1,
                None => {}
            }
        }
        debug!(execution = %execution, completed, "Execution status checked");
        Ok(status)
    }

    async fn fetch_logs(&self, execution: &str) -> Result<String, WardenError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            ..Default::default()
        };

        let mut stream = self.docker.logs(execution, Some(options));
        let mut collected = String::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(output) => collected.push_str(&format!("{}", output)),
                Err(e) => {
                    return Err(WardenError::Executor(format!("Failed to retrieve logs: {}", e)))
                }
            }
        }
        Ok(collected)
    }

    async fn delete_job(&self, job_name: &str) -> Result<(), WardenError> {
        self.docker
            .remove_container(
                job_name,
                Some(RemoveContainerOptions { force: true, ..Default::default() }),
            )
            .await
            .map_err(|e| WardenError::Executor(format!("Failed to delete job: {}", e)))?;

        info!(job = %job_name, "Job deleted");
        Ok(())
    }
}

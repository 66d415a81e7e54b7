// src/executors/docker.rs
use async_trait::async_trait;
use bollard::container::LogOutput; // For LogOutput::StdOut, LogOutput::StdErr
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerCreateBody, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptions as BollardCreateContainerOptionsQuery,
    CreateImageOptions as BollardCreateImageOptionsQuery,
    LogsOptions as BollardLogsOptionsQuery,
    RemoveContainerOptions as BollardRemoveContainerOptionsQuery,
    StartContainerOptions as BollardStartContainerOptionsQuery,
    WaitContainerOptions as BollardWaitContainerOptionsQuery,
};
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::default::Default;

use super::{SandboxEngine, SandboxSpec};
use crate::errors::RunnerError;

/// Runs sandboxes as Docker containers through the local engine socket.
#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Build a client for the local engine. No request is made yet, so an
    /// unreachable daemon shows up on the first run.
    pub fn connect() -> Result<Self, RunnerError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| RunnerError::EngineConnect(format!("Failed to connect to Docker: {}", e)))?;
        Ok(Self { docker })
    }

    /// Pull `image` unless the engine already has it.
    async fn ensure_image(&self, image: &str) -> Result<(), RunnerError> {
        match self.docker.inspect_image(image).await {
            Ok(_) => return Ok(()),
            Err(BollardError::DockerResponseServerError { status_code: 404, .. }) => {}
            Err(e) => return Err(e.into()),
        }

        log::info!("Image {} not present locally, pulling", image);
        let pull_options = Some(BollardCreateImageOptionsQuery {
            from_image: Some(image.to_string()),
            ..Default::default()
        });

        let mut pull_stream = self.docker.create_image(pull_options, None, None);
        while let Some(progress) = pull_stream.next().await {
            let progress = progress?;
            if let Some(status) = progress.status {
                log::debug!("Pulling {}: {}", image, status);
            }
        }
        Ok(())
    }

    /// Start the created container, wait for it under the timeout and read
    /// its output.
    async fn drive(&self, container_id: &str, spec: &SandboxSpec) -> Result<Vec<u8>, RunnerError> {
        self.docker
            .start_container(container_id, None::<BollardStartContainerOptionsQuery>)
            .await?;

        let mut wait_stream = self
            .docker
            .wait_container(container_id, None::<BollardWaitContainerOptionsQuery>);
        let timeout_future = tokio::time::sleep(spec.timeout);

        let wait_outcome = tokio::select! {
            res = wait_stream.next() => res,
            _ = timeout_future => {
                log::warn!("Execution timed out for container {}", container_id);
                return Err(RunnerError::Timeout { seconds: spec.timeout.as_secs() });
            }
        };

        // bollard reports a non-zero status as a wait error carrying the code.
        let exit_code = match wait_outcome {
            Some(Ok(response)) => response.status_code,
            Some(Err(BollardError::DockerContainerWaitError { code, .. })) => code,
            Some(Err(e)) => return Err(e.into()),
            None => {
                return Err(RunnerError::Engine(
                    "Container wait stream ended unexpectedly".to_string(),
                ))
            }
        };

        let output = self.collect_output(container_id).await?;

        if exit_code != 0 {
            return Err(RunnerError::NonZeroExit {
                exit_code,
                command: spec.command_line(),
                image: spec.image.clone(),
                output: String::from_utf8_lossy(&output).into_owned(),
            });
        }

        Ok(output)
    }

    /// stdout and stderr interleaved in the order the engine recorded them
    async fn collect_output(&self, container_id: &str) -> Result<Vec<u8>, RunnerError> {
        let mut output_stream = self.docker.logs(
            container_id,
            Some(BollardLogsOptionsQuery {
                stdout: true,
                stderr: true,
                ..Default::default()
            }),
        );

        let mut combined = Vec::new();
        while let Some(log_result) = output_stream.next().await {
            match log_result? {
                LogOutput::StdOut { message }
                | LogOutput::StdErr { message }
                | LogOutput::Console { message } => combined.extend_from_slice(&message),
                LogOutput::StdIn { .. } => {}
            }
        }
        Ok(combined)
    }

    async fn remove(&self, container_id: &str) {
        let options = Some(BollardRemoveContainerOptionsQuery {
            force: true,
            ..Default::default()
        });
        match self.docker.remove_container(container_id, options).await {
            Ok(()) => log::debug!("Removed container {}", container_id),
            Err(BollardError::DockerResponseServerError { status_code: 404, .. }) => {}
            Err(e) => log::warn!("Failed to remove container {}: {}", container_id, e),
        }
    }
}

#[async_trait]
impl SandboxEngine for DockerEngine {
    async fn run(&self, spec: &SandboxSpec) -> Result<Vec<u8>, RunnerError> {
        if spec.pull_missing_image {
            self.ensure_image(&spec.image).await?;
        }

        let options = Some(BollardCreateContainerOptionsQuery {
            name: Some(spec.name.clone()),
            ..Default::default()
        });

        // Removal is done explicitly below; auto-remove would race the log read.
        let config = ContainerCreateBody {
            image: Some(spec.image.clone()),
            cmd: Some(spec.command.clone()),
            working_dir: Some(spec.working_dir.clone()),
            user: spec.user.clone(),
            host_config: Some(HostConfig {
                binds: Some(vec![spec.mount.to_bind_string()]),
                auto_remove: Some(false),
                ..Default::default()
            }),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let container = self.docker.create_container(options, config).await?;
        log::debug!("Created container {} ({})", spec.name, container.id);

        // Removal with force also kills a container that hit the timeout.
        let outcome = self.drive(&container.id, spec).await;
        self.remove(&container.id).await;

        outcome
    }

    async fn is_available(&self) -> bool {
        self.docker.ping().await.is_ok()
    }
}

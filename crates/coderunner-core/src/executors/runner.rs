// src/executors/runner.rs
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::staging::StagedScript;
use super::{BindMount, DockerEngine, ExecutionResult, SandboxEngine, SandboxSpec};
use crate::config::RunnerConfig;
use crate::errors::RunnerError;
use crate::session::{SessionState, RESULT_KEY};

/// Runs caller code once inside a fresh sandbox.
///
/// Each call stages its own file and launches its own sandbox, so a single
/// runner can be shared behind an `Arc` by concurrent callers. The engine
/// handle is the only state shared between calls.
pub struct SandboxRunner {
    engine: Arc<dyn SandboxEngine>,
    config: RunnerConfig,
}

impl SandboxRunner {
    pub fn new(engine: Arc<dyn SandboxEngine>, config: &RunnerConfig) -> Self {
        Self {
            engine,
            config: config.clone(),
        }
    }

    /// Runner backed by the local Docker engine.
    pub fn docker(config: &RunnerConfig) -> Result<Self, RunnerError> {
        let engine = DockerEngine::connect()?;
        Ok(Self::new(Arc::new(engine), config))
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn engine(&self) -> Arc<dyn SandboxEngine> {
        Arc::clone(&self.engine)
    }

    /// Run `code` and fold every failure into the `"Error: "` convention.
    /// When `session` is given, the returned text is also stored under
    /// [`RESULT_KEY`].
    pub async fn run(&self, code: &str, session: Option<&mut SessionState>) -> ExecutionResult {
        let outcome = self.execute(code).await;
        if let Err(e) = &outcome {
            if e.is_program_failure() {
                log::info!("Sandboxed program failed: {}", e);
            } else {
                log::warn!("Sandbox infrastructure failure: {}", e);
            }
        }

        let result = ExecutionResult::from_outcome(outcome);
        if let Some(session) = session {
            session.set(RESULT_KEY, result.as_str());
        }
        result
    }

    /// Run `code` keeping the failure category.
    pub async fn execute(&self, code: &str) -> Result<String, RunnerError> {
        let staged = StagedScript::stage(
            code,
            &self.config.script_suffix,
            self.config.staging_dir.as_deref(),
        )
        .await?;

        let spec = self.sandbox_spec(&staged);
        log::debug!(
            "Launching sandbox {} with image {}: {}",
            spec.name,
            spec.image,
            spec.command_line()
        );

        let outcome = self.engine.run(&spec).await;
        staged.cleanup();

        let output = String::from_utf8(outcome?)?;
        log::info!("Sandbox {} finished ({} bytes of output)", spec.name, output.len());
        Ok(output)
    }

    fn sandbox_spec(&self, staged: &StagedScript) -> SandboxSpec {
        SandboxSpec {
            name: format!("code-exec-{}", Uuid::new_v4()),
            image: self.config.image.clone(),
            command: vec![
                self.config.interpreter.clone(),
                staged.file_name().to_string(),
            ],
            mount: BindMount {
                host_path: staged.dir().to_path_buf(),
                sandbox_path: self.config.working_dir.clone(),
                read_write: true,
            },
            working_dir: self.config.working_dir.clone(),
            user: staging_owner(staged.dir()),
            pull_missing_image: self.config.pull_missing_image,
            timeout: self.config.timeout_duration(),
        }
    }
}

/// Owner of the staging directory as `uid:gid`, so files the sandbox writes
/// into the bind mount stay removable by the host process.
#[cfg(unix)]
fn staging_owner(dir: &Path) -> Option<String> {
    use std::os::unix::fs::MetadataExt;
    match std::fs::metadata(dir) {
        Ok(meta) => Some(format!("{}:{}", meta.uid(), meta.gid())),
        Err(e) => {
            log::warn!("Cannot read owner of {}: {}", dir.display(), e);
            None
        }
    }
}

#[cfg(not(unix))]
fn staging_owner(_dir: &Path) -> Option<String> {
    None
}

//! Code execution environments for sandboxed runtime evaluation.
//!
//! A run stages the caller's code on the host, hands a [`SandboxSpec`] to a
//! [`SandboxEngine`], and folds whatever comes back into an
//! [`ExecutionResult`]. The engine is the only seam: production uses Docker,
//! tests substitute their own.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::RunnerError;

pub mod docker;
pub mod runner;
pub mod staging;

pub use docker::DockerEngine;
pub use runner::SandboxRunner;
pub use staging::StagedScript;

/// Outcome of one sandbox run. Exactly one payload is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Decoded combined stdout/stderr
    Success(String),
    /// Error description, already carrying the `"Error: "` prefix
    Failure(String),
}

impl ExecutionResult {
    pub fn from_outcome(outcome: Result<String, RunnerError>) -> Self {
        match outcome {
            Ok(output) => ExecutionResult::Success(output),
            Err(err) => ExecutionResult::Failure(err.to_payload()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExecutionResult::Success(s) | ExecutionResult::Failure(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            ExecutionResult::Success(s) | ExecutionResult::Failure(s) => s,
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host directory bound into the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub host_path: PathBuf,
    pub sandbox_path: String,
    pub read_write: bool,
}

impl BindMount {
    /// Docker `binds` entry, e.g. `/tmp/code-exec-x:/tmp:rw`
    pub fn to_bind_string(&self) -> String {
        let mode = if self.read_write { "rw" } else { "ro" };
        format!("{}:{}:{}", self.host_path.display(), self.sandbox_path, mode)
    }
}

/// Everything an engine needs to launch one sandbox.
#[derive(Debug, Clone)]
pub struct SandboxSpec {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub mount: BindMount,
    pub working_dir: String,
    /// `uid:gid` the sandboxed process runs as; image default when unset
    pub user: Option<String>,
    pub pull_missing_image: bool,
    pub timeout: Duration,
}

impl SandboxSpec {
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

#[async_trait]
pub trait SandboxEngine: Send + Sync {
    /// Run one sandbox to completion and return its combined output bytes.
    /// The sandbox must be gone by the time this returns, whatever the
    /// outcome.
    async fn run(&self, spec: &SandboxSpec) -> Result<Vec<u8>, RunnerError>;

    async fn is_available(&self) -> bool;
}

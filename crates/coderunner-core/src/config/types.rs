//! Configuration types for the sandboxed code runner

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Everything the runner needs to launch a sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Container image the code runs in
    #[serde(default = "default_image")]
    pub image: String,
    /// Wall-clock budget per run, in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Program invoked with the staged file name as its only argument
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// In-container directory the staging directory is bound to
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
    #[serde(default = "default_script_suffix")]
    pub script_suffix: String,
    /// Host directory staged files are created under; system temp dir when unset
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub pull_missing_image: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            timeout: default_timeout(),
            interpreter: default_interpreter(),
            working_dir: default_working_dir(),
            script_suffix: default_script_suffix(),
            staging_dir: None,
            pull_missing_image: true,
        }
    }
}

impl RunnerConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image.trim().is_empty() {
            return Err(ConfigError::Validation("image must not be empty".to_string()));
        }
        if self.interpreter.trim().is_empty() {
            return Err(ConfigError::Validation("interpreter must not be empty".to_string()));
        }
        if self.timeout == 0 {
            return Err(ConfigError::Validation("timeout must be greater than zero".to_string()));
        }
        if !self.working_dir.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "working_dir must be an absolute path, got '{}'",
                self.working_dir
            )));
        }
        if let Some(dir) = &self.staging_dir {
            if !dir.is_dir() {
                return Err(ConfigError::Validation(format!(
                    "staging_dir {} is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

fn default_image() -> String { "python:3.9-slim".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_interpreter() -> String { "python".to_string() }
fn default_working_dir() -> String { "/tmp".to_string() }
fn default_script_suffix() -> String { ".py".to_string() }
fn default_true() -> bool { true }

//! Configuration loader for YAML files and environment resolution
//!
//! Precedence, lowest first: built-in defaults, YAML file, environment.

use crate::config::types::RunnerConfig;
use crate::errors::ConfigError;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const ENV_IMAGE: &str = "DOCKER_IMAGE";
pub const ENV_TIMEOUT: &str = "DOCKER_TIMEOUT";
pub const ENV_INTERPRETER: &str = "DOCKER_INTERPRETER";
pub const ENV_WORKING_DIR: &str = "DOCKER_WORKDIR";
pub const ENV_PULL_IMAGE: &str = "DOCKER_PULL_IMAGE";
pub const ENV_STAGING_DIR: &str = "CODERUNNER_STAGING_DIR";

/// Configuration loader with environment resolution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults plus process environment overrides
    pub fn from_env() -> Result<RunnerConfig, ConfigError> {
        let mut config = RunnerConfig::default();
        Self::apply_env_overrides(&mut config, |name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<RunnerConfig, ConfigError> {
        let mut config: RunnerConfig = if content.trim().is_empty() {
            RunnerConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };

        Self::apply_env_overrides(&mut config, |name| env::var(name).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Resolve an optional file source; `None` means environment only
    pub async fn from_source(path: Option<&Path>) -> Result<RunnerConfig, ConfigError> {
        match path {
            Some(path) => Self::from_file(path).await,
            None => Self::from_env(),
        }
    }

    /// Overlay environment values onto `config`. Blank values are ignored.
    pub fn apply_env_overrides<F>(config: &mut RunnerConfig, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(image) = get(ENV_IMAGE) {
            config.image = image;
        }
        if let Some(raw) = get(ENV_TIMEOUT) {
            config.timeout = raw.parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_TIMEOUT.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(interpreter) = get(ENV_INTERPRETER) {
            config.interpreter = interpreter;
        }
        if let Some(dir) = get(ENV_WORKING_DIR) {
            config.working_dir = dir;
        }
        if let Some(raw) = get(ENV_PULL_IMAGE) {
            config.pull_missing_image = parse_bool(&raw).ok_or_else(|| ConfigError::InvalidEnv {
                name: ENV_PULL_IMAGE.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(dir) = get(ENV_STAGING_DIR) {
            config.staging_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

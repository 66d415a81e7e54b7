//! Configuration for the sandboxed code runner
//!
//! Settings are resolved once at process start: built-in defaults, then an
//! optional YAML file, then environment overrides. The resolved
//! [`RunnerConfig`] is validated and handed to the runner by reference.

pub mod types;
pub mod loader;

pub use types::*;
pub use loader::*;

#[cfg(test)]
mod tests;

use crate::errors::ConfigError;
use std::path::Path;

/// Load a configuration from a YAML file and apply environment overrides
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
    ConfigLoader::from_file(path).await
}

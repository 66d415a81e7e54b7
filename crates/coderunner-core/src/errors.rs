//! Error types for sandboxed execution, configuration and tool dispatch
//!
//! Each stage of a sandbox run fails in its own variant so that logs can say
//! exactly what went wrong. Callers of the runner never see these directly:
//! the runner flattens every variant into the `"Error: "` string convention
//! at its outer boundary.

use thiserror::Error;

/// Prefix carried by every failure payload handed back to callers.
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("could not stage code into a temporary file: {0}")]
    Staging(#[from] std::io::Error),
    #[error("container engine unavailable: {0}")]
    EngineConnect(String),
    #[error("execution timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("Command '{command}' in image '{image}' returned non-zero exit status {exit_code}: {output}")]
    NonZeroExit {
        exit_code: i64,
        command: String,
        image: String,
        output: String,
    },
    #[error("output is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    #[error("container engine error: {0}")]
    Engine(String),
}

impl RunnerError {
    /// True when the sandboxed program itself failed, as opposed to the
    /// machinery around it.
    pub fn is_program_failure(&self) -> bool {
        matches!(self, RunnerError::NonZeroExit { .. } | RunnerError::Timeout { .. })
    }

    /// Flat string form used at the caller boundary.
    pub fn to_payload(&self) -> String {
        format!("{}{}", ERROR_PREFIX, self)
    }
}

impl From<bollard::errors::Error> for RunnerError {
    fn from(err: bollard::errors::Error) -> Self {
        use bollard::errors::Error as BollardError;
        match err {
            BollardError::DockerResponseServerError { status_code, message } => {
                RunnerError::Engine(format!("{} (status {})", message, status_code))
            }
            BollardError::RequestTimeoutError => {
                RunnerError::EngineConnect("request to the container engine timed out".to_string())
            }
            BollardError::JsonSerdeError { .. }
            | BollardError::DockerStreamError { .. }
            | BollardError::DockerContainerWaitError { .. } => RunnerError::Engine(err.to_string()),
            other => RunnerError::EngineConnect(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },
    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnv { name: String, value: String },
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Error, Debug, Clone)]
pub enum ToolError {
    #[error("Invalid arguments for '{tool_name}': {message}")]
    InvalidArguments { tool_name: String, message: String },
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_carries_prefix() {
        let err = RunnerError::Timeout { seconds: 30 };
        assert_eq!(err.to_payload(), "Error: execution timed out after 30 seconds");
    }

    #[test]
    fn test_non_zero_exit_includes_output() {
        let err = RunnerError::NonZeroExit {
            exit_code: 1,
            command: "python script.py".to_string(),
            image: "python:3.9-slim".to_string(),
            output: "ValueError: x\n".to_string(),
        };
        let payload = err.to_payload();
        assert!(payload.starts_with(ERROR_PREFIX));
        assert!(payload.contains("non-zero exit status 1"));
        assert!(payload.contains("ValueError: x"));
    }

    #[test]
    fn test_program_failure_classification() {
        assert!(RunnerError::Timeout { seconds: 1 }.is_program_failure());
        assert!(!RunnerError::EngineConnect("socket".to_string()).is_program_failure());
        assert!(!RunnerError::Staging(std::io::Error::other("disk full")).is_program_failure());
    }

    #[test]
    fn test_server_error_maps_to_engine() {
        let err: RunnerError = bollard::errors::Error::DockerResponseServerError {
            status_code: 500,
            message: "boom".to_string(),
        }
        .into();
        assert!(matches!(err, RunnerError::Engine(ref m) if m.contains("boom")));
    }
}

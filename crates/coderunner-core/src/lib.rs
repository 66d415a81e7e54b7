//! One-shot sandboxed code execution for agent tools.
//!
//! The crate runs a piece of caller-supplied code exactly once inside a
//! disposable container and hands back what it printed. Every run stages
//! the code in its own temporary directory, launches one container with a
//! wall-clock limit, collects the combined output, and removes both the
//! container and the staged file before returning.
//!
//! # Layout
//!
//! - **config**: runner settings from defaults, YAML and the environment
//! - **executors**: staging, the engine seam, the Docker engine and the runner
//! - **session**: the key-value store tool calls report their outcome into
//! - **tools**: the `execute_python_code` agent tool and its registry
//!
//! Failures of any kind reach callers as text starting with `"Error: "`;
//! [`SandboxRunner::execute`] keeps the precise [`RunnerError`] for callers
//! that want it.

pub mod config;
pub mod errors;
pub mod executors;
pub mod session;
pub mod tools;

pub use config::{ConfigLoader, RunnerConfig};
pub use errors::{ConfigError, RunnerError, ToolError, ERROR_PREFIX};
pub use executors::{
    BindMount, DockerEngine, ExecutionResult, SandboxEngine, SandboxRunner, SandboxSpec,
    StagedScript,
};
pub use session::{SessionState, RESULT_KEY};
pub use tools::{ExecuteCodeTool, Tool, ToolFactory, ToolMetadata, ToolRegistry};

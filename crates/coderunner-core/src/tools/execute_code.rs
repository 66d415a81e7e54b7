//! Agent tool that runs generated Python code in the sandbox
//!
//! The tool never fails because the code failed: sandbox outcomes come back
//! as text, with failures prefixed `"Error: "`, so the agent can read the
//! traceback and try again. Only malformed tool arguments are reported as
//! tool errors.

use crate::errors::ToolError;
use crate::executors::SandboxRunner;
use crate::session::{SessionState, RESULT_KEY};
use crate::tools::{clean_generated_code, Tool, ToolMetadata};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const TOOL_NAME: &str = "execute_python_code";

pub struct ExecuteCodeTool {
    runner: Arc<SandboxRunner>,
    session: Option<Arc<RwLock<SessionState>>>,
}

impl ExecuteCodeTool {
    pub fn new(runner: Arc<SandboxRunner>) -> Self {
        Self {
            runner,
            session: None,
        }
    }

    /// Record every outcome under `"result"` in `session`.
    pub fn with_session(mut self, session: Arc<RwLock<SessionState>>) -> Self {
        self.session = Some(session);
        self
    }
}

#[async_trait]
impl Tool for ExecuteCodeTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: TOOL_NAME.to_string(),
            description: format!(
                "Executes Python code in an isolated container ({}) and returns its combined stdout and stderr. Runs are limited to {} seconds. Failures are returned as text starting with 'Error: '.",
                self.runner.config().image,
                self.runner.config().timeout
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Complete, self-contained Python program. Print anything you want to see."
                    }
                },
                "required": ["code"]
            }),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let code = arguments
            .get("code")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments {
                tool_name: TOOL_NAME.to_string(),
                message: "Missing or invalid 'code' parameter".to_string(),
            })?;

        let code = clean_generated_code(code);

        let result = self.runner.run(&code, None).await;
        if let Some(session) = &self.session {
            // Lock only for the write; the session stays readable during the run.
            session.write().await.set(RESULT_KEY, result.as_str());
        }

        log::info!(
            "{}: {} ({} bytes)",
            TOOL_NAME,
            if result.is_success() { "succeeded" } else { "failed" },
            result.as_str().len()
        );

        Ok(result.into_string())
    }
}

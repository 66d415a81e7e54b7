//! Tool system exposing the sandbox to agent frameworks
//!
//! An agent picks a tool by name, hands it JSON arguments, and gets text
//! back. Tools are registered in a [`ToolRegistry`] and looked up at
//! dispatch time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::ToolError;
use crate::executors::SandboxRunner;
use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

// Core Tool trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    fn metadata(&self) -> ToolMetadata;
    async fn execute(&self, arguments: Value) -> Result<String, ToolError>;
}

// Tool registry for managing multiple tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register_tool(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.metadata().name.clone();
        self.tools.insert(name, tool);
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list_tools(&self) -> Vec<ToolMetadata> {
        self.tools.values().map(|tool| tool.metadata()).collect()
    }

    /// Look up `name` and run it with `arguments`.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        let tool = self
            .get_tool(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(arguments).await
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Tool factory for creating common tools
pub struct ToolFactory;

impl ToolFactory {
    pub fn create_execute_code(runner: Arc<SandboxRunner>) -> Arc<dyn Tool> {
        Arc::new(execute_code::ExecuteCodeTool::new(runner))
    }

    pub fn create_execute_code_with_session(
        runner: Arc<SandboxRunner>,
        session: Arc<RwLock<SessionState>>,
    ) -> Arc<dyn Tool> {
        Arc::new(execute_code::ExecuteCodeTool::new(runner).with_session(session))
    }

    pub fn create_default_registry(runner: Arc<SandboxRunner>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_tool(Self::create_execute_code(runner));
        registry
    }
}

pub mod code_cleanup;
pub mod execute_code;

pub use code_cleanup::clean_generated_code;
pub use execute_code::ExecuteCodeTool;

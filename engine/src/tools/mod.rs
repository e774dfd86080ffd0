//! Tool registry and dispatch
//!
//! Tools are the capabilities the reasoning loop may invoke during an Act
//! step. Each tool exposes a name, a human-readable description, a
//! JSON-schema-shaped parameter description, and an execute operation.
//! The registry is built once at startup and fails fast on duplicate names.
//!
//! Dispatch never raises: unknown names and execution failures are rendered
//! into `"Error: …"` strings appended to the conversation, so the model can
//! observe the failure and adapt.

pub mod filesystem;
pub mod shell;
pub mod web_search;

pub use filesystem::FileSystemTool;
pub use shell::ShellCommandTool;
pub use web_search::{SearchHit, SearchProvider, StaticSearchProvider, WebSearchTool};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Config, ToolsConfig};
use crate::guard::PermissionGuard;
use sdk::{EngineError, ToolError};

/// A named capability the reasoning loop may invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique dispatch name
    fn name(&self) -> &'static str;

    /// Human-readable description advertised to the model
    fn description(&self) -> &'static str;

    /// Schema in the shape consumed by the completion provider:
    /// `{"name", "description", "parameters": {...}}`
    fn schema(&self) -> serde_json::Value;

    /// Run the tool against opaque serialized arguments
    async fn execute(&self, arguments_json: &str) -> Result<String, ToolError>;
}

/// Registry of available tools, keyed by dispatch name
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build a registry from a fixed set of tools.
    ///
    /// Fails fast on duplicate names so a misconfigured tool set cannot
    /// shadow capabilities at dispatch time.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self, EngineError> {
        let mut by_name = HashMap::with_capacity(tools.len());
        for tool in &tools {
            if by_name
                .insert(tool.name().to_string(), Arc::clone(tool))
                .is_some()
            {
                return Err(EngineError::DuplicateTool(tool.name().to_string()));
            }
        }

        info!(
            "Loaded tools: {}",
            tools
                .iter()
                .map(|t| t.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self { tools, by_name })
    }

    /// Create an empty registry with no tools enabled
    pub fn empty() -> Self {
        Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Names of all registered tools, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// All tool schemas, serialized for the completion provider
    pub fn schemas(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.schema().to_string()).collect()
    }

    /// Dispatch a tool call by name.
    ///
    /// Returns the tool output as a string. Failures are returned as
    /// `"Error: …"` strings rather than raised, so the loop continues.
    pub async fn dispatch(&self, name: &str, arguments_json: &str) -> String {
        let Some(tool) = self.by_name.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return format!("Error: Unknown tool '{}'.", name);
        };

        debug!("Executing tool: {}", name);
        match tool.execute(arguments_json).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool '{}' failed: {}", name, e);
                format!("Error: {}", e)
            }
        }
    }
}

/// Build the registry of built-in tools enabled by configuration
pub fn builtin_registry(
    config: &Config,
    guard: &Arc<PermissionGuard>,
) -> Result<ToolRegistry, EngineError> {
    let mut tools: Vec<Arc<dyn Tool>> = Vec::new();
    let ToolsConfig {
        file_system,
        shell_command,
        web_search,
    } = &config.tools;

    if *file_system {
        tools.push(Arc::new(FileSystemTool::new(Arc::clone(guard))));
    }
    if *shell_command {
        tools.push(Arc::new(ShellCommandTool::new(Arc::clone(guard))));
    }
    if *web_search {
        tools.push(Arc::new(WebSearchTool::new(Arc::new(
            StaticSearchProvider::default(),
        ))));
    }

    ToolRegistry::new(tools)
}

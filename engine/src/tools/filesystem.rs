//! Filesystem tool
//!
//! Read and write files inside the guarded workspace. Every path is
//! validated through the [`PermissionGuard`] before any I/O happens.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::guard::PermissionGuard;
use crate::tools::Tool;
use sdk::ToolError;

pub struct FileSystemTool {
    guard: Arc<PermissionGuard>,
}

#[derive(Debug, Deserialize)]
struct FileArgs {
    operation: String,
    path: String,
    #[serde(default)]
    content: Option<String>,
}

impl FileSystemTool {
    pub fn new(guard: Arc<PermissionGuard>) -> Self {
        Self { guard }
    }

    async fn read(&self, path: &str) -> Result<String, ToolError> {
        let resolved = self
            .guard
            .check_path(Path::new(path))
            .map_err(|e| ToolError::AccessDenied(e.to_string()))?;

        info!("Reading file: {}", resolved.display());
        let content = fs::read_to_string(&resolved).await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to read {}: {}", resolved.display(), e))
        })?;

        debug!("Read {} bytes from {}", content.len(), resolved.display());
        Ok(content)
    }

    async fn write(&self, path: &str, content: &str) -> Result<String, ToolError> {
        let resolved = self
            .guard
            .check_write_path(Path::new(path))
            .map_err(|e| ToolError::AccessDenied(e.to_string()))?;

        // The resolved path is already confirmed inside the workspace, so
        // missing parent directories are safe to create.
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ToolError::ExecutionFailed(format!(
                    "Failed to create directories {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        info!("Writing {} bytes to: {}", content.len(), resolved.display());
        fs::write(&resolved, content).await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to write {}: {}", resolved.display(), e))
        })?;

        Ok(format!(
            "Wrote {} bytes to {}",
            content.len(),
            resolved.display()
        ))
    }
}

#[async_trait]
impl Tool for FileSystemTool {
    fn name(&self) -> &'static str {
        "file_system"
    }

    fn description(&self) -> &'static str {
        "Read or write files in the agent's workspace."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": {
                "type": "object",
                "properties": {
                    "operation": { "type": "string", "enum": ["read", "write"] },
                    "path": { "type": "string" },
                    "content": { "type": "string" }
                },
                "required": ["operation", "path"]
            }
        })
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, ToolError> {
        let args: FileArgs = serde_json::from_str(arguments_json)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        match args.operation.as_str() {
            "read" => self.read(&args.path).await,
            "write" => {
                self.write(&args.path, args.content.as_deref().unwrap_or_default())
                    .await
            }
            other => Err(ToolError::InvalidArguments(format!(
                "unknown file operation '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool(temp: &TempDir) -> FileSystemTool {
        let guard = PermissionGuard::new(temp.path().to_path_buf(), Vec::new()).unwrap();
        FileSystemTool::new(Arc::new(guard))
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let tool = tool(&temp);

        let out = tool
            .execute(r#"{"operation":"write","path":"notes.txt","content":"hello"}"#)
            .await
            .unwrap();
        assert!(out.starts_with("Wrote 5 bytes"));

        let content = tool
            .execute(r#"{"operation":"read","path":"notes.txt"}"#)
            .await
            .unwrap();
        assert_eq!(content, "hello");
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let tool = tool(&temp);

        tool.execute(r#"{"operation":"write","path":"a/b/c.txt","content":"x"}"#)
            .await
            .unwrap();
        assert!(temp.path().join("a/b/c.txt").is_file());
    }

    #[tokio::test]
    async fn test_read_outside_workspace_is_denied() {
        let temp = TempDir::new().unwrap();
        let tool = tool(&temp);

        let result = tool
            .execute(r#"{"operation":"read","path":"../../etc/passwd"}"#)
            .await;
        assert!(matches!(result, Err(ToolError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn test_read_missing_file_reports_failure() {
        let temp = TempDir::new().unwrap();
        let tool = tool(&temp);

        let result = tool
            .execute(r#"{"operation":"read","path":"missing.txt"}"#)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unknown_operation_is_invalid() {
        let temp = TempDir::new().unwrap();
        let tool = tool(&temp);

        let result = tool
            .execute(r#"{"operation":"delete","path":"x.txt"}"#)
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}

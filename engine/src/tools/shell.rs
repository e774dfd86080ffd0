//! Shell command tool
//!
//! Spawns a subprocess in the workspace directory and captures its output.
//! Commands are validated through the [`PermissionGuard`] shell policy
//! before anything runs. There is deliberately no execution ceiling here: a
//! hung subprocess blocks the task's current iteration until it exits.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{info, warn};

use crate::guard::PermissionGuard;
use crate::tools::Tool;
use sdk::ToolError;

pub struct ShellCommandTool {
    guard: Arc<PermissionGuard>,
}

#[derive(Debug, Deserialize)]
struct ShellArgs {
    command: String,
}

impl ShellCommandTool {
    pub fn new(guard: Arc<PermissionGuard>) -> Self {
        Self { guard }
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd.exe");
    cmd.arg("/C").arg(command);
    cmd
}

#[async_trait]
impl Tool for ShellCommandTool {
    fn name(&self) -> &'static str {
        "shell_command"
    }

    fn description(&self) -> &'static str {
        "Executes a single shell command in the sandboxed workspace."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": {
                "type": "object",
                "properties": {
                    "command": { "type": "string" }
                },
                "required": ["command"]
            }
        })
    }

    async fn execute(&self, arguments_json: &str) -> Result<String, ToolError> {
        let args: ShellArgs = serde_json::from_str(arguments_json)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        if args.command.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "command must not be empty".to_string(),
            ));
        }

        self.guard
            .check_command(&args.command)
            .map_err(|e| ToolError::AccessDenied(e.to_string()))?;

        info!("Executing shell command: {}", args.command);
        let output = shell_command(&args.command)
            .current_dir(self.guard.workspace())
            .output()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to spawn shell: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            warn!("Shell command failed with {}", output.status);
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(ToolError::ExecutionFailed(format!(
                "Command exited with code {}: {}",
                code,
                stderr.trim()
            )));
        }

        if stdout.trim().is_empty() {
            Ok("(no output)".to_string())
        } else {
            Ok(stdout)
        }
    }
}

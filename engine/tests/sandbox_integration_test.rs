//! Integration tests for the tool sandbox
//!
//! Exercises the built-in tools through registry dispatch, verifying that
//! the permission guard's denials surface as error strings the model can
//! observe rather than as raised errors.

use std::sync::Arc;
use tempfile::TempDir;

use drover_engine::config::Config;
use drover_engine::guard::PermissionGuard;
use drover_engine::tools::{builtin_registry, FileSystemTool, ShellCommandTool, ToolRegistry};

fn registry(temp: &TempDir) -> ToolRegistry {
    let guard = Arc::new(
        PermissionGuard::new(
            temp.path().to_path_buf(),
            vec!["rm".to_string(), "sudo".to_string(), "chmod".to_string()],
        )
        .unwrap(),
    );
    ToolRegistry::new(vec![
        Arc::new(FileSystemTool::new(Arc::clone(&guard))),
        Arc::new(ShellCommandTool::new(guard)),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_traversal_denial_surfaces_as_error_string() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    let out = registry
        .dispatch(
            "file_system",
            r#"{"operation":"read","path":"../../etc/passwd"}"#,
        )
        .await;
    assert!(out.starts_with("Error: Access denied:"), "got: {out}");
}

#[tokio::test]
async fn test_blacklisted_command_surfaces_as_error_string() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    let out = registry
        .dispatch("shell_command", r#"{"command":"rm -rf important"}"#)
        .await;
    assert!(out.contains("blacklisted"), "got: {out}");
    assert!(out.starts_with("Error:"));
}

#[tokio::test]
async fn test_chaining_denial_surfaces_as_error_string() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    for command in ["echo a && echo b", "echo a || echo b", "echo a; echo b"] {
        let out = registry
            .dispatch(
                "shell_command",
                &format!(r#"{{"command":"{command}"}}"#),
            )
            .await;
        assert!(out.contains("chaining"), "command {command:?} got: {out}");
    }
}

#[tokio::test]
async fn test_unknown_tool_error_string_is_exact() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    let out = registry.dispatch("teleport", "{}").await;
    assert_eq!(out, "Error: Unknown tool 'teleport'.");
}

#[tokio::test]
async fn test_invalid_arguments_surface_as_error_string() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    let out = registry.dispatch("file_system", "not json").await;
    assert!(out.starts_with("Error: Invalid arguments:"), "got: {out}");
}

#[tokio::test]
async fn test_workspace_write_and_read_through_dispatch() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    let out = registry
        .dispatch(
            "file_system",
            r#"{"operation":"write","path":"report.txt","content":"findings"}"#,
        )
        .await;
    assert!(out.starts_with("Wrote 8 bytes"), "got: {out}");

    let out = registry
        .dispatch("file_system", r#"{"operation":"read","path":"report.txt"}"#)
        .await;
    assert_eq!(out, "findings");
}

#[cfg(unix)]
#[tokio::test]
async fn test_shell_output_captured_through_dispatch() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    let out = registry
        .dispatch("shell_command", r#"{"command":"echo sandboxed"}"#)
        .await;
    assert_eq!(out.trim(), "sandboxed");
}

#[cfg(unix)]
#[tokio::test]
async fn test_nonzero_exit_reported_through_dispatch() {
    let temp = TempDir::new().unwrap();
    let registry = registry(&temp);

    let out = registry
        .dispatch("shell_command", r#"{"command":"false"}"#)
        .await;
    assert!(out.starts_with("Error:"), "got: {out}");
    assert!(out.contains("exited with code 1"));
}

#[tokio::test]
async fn test_builtin_registry_respects_enablement_flags() {
    let temp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.core.workspace = temp.path().to_path_buf();
    config.tools.shell_command = false;

    let guard = Arc::new(
        PermissionGuard::new(config.core.workspace.clone(), Vec::new()).unwrap(),
    );
    let registry = builtin_registry(&config, &guard).unwrap();

    let names = registry.names();
    assert!(names.contains(&"file_system"));
    assert!(names.contains(&"web_search"));
    assert!(!names.contains(&"shell_command"));

    let out = registry
        .dispatch("shell_command", r#"{"command":"echo hi"}"#)
        .await;
    assert_eq!(out, "Error: Unknown tool 'shell_command'.");
}

//! Error types and handling
//!
//! This module provides the error types shared across the Drover engine.
//! Component-local failures (completion provider errors, per-tool failures)
//! have their own types; everything that crosses a component boundary uses
//! `EngineError`.

use std::path::PathBuf;
use thiserror::Error;

/// Main engine error type
///
/// Represents failures raised by the engine's own components: configuration,
/// persistence, the permission guard, and tool registration. Messages are
/// plain strings safe to surface to callers.
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Permission guard: file access
    #[error("Path is outside the workspace: {0}")]
    PathOutsideWorkspace(PathBuf),

    #[error("Failed to resolve path {0}: {1}")]
    PathResolution(PathBuf, String),

    // Permission guard: shell commands
    #[error("Command '{0}' is blacklisted")]
    CommandBlacklisted(String),

    #[error("Command chaining is not permitted: {0}")]
    CommandChaining(String),

    // Tool registry construction
    #[error("Duplicate tool registered: '{0}'")]
    DuplicateTool(String),
}

/// Error raised by a tool's execute operation.
///
/// Never crosses the dispatch boundary as an error: the dispatcher renders
/// it into an `"Error: …"` string appended to the conversation so the model
/// can observe the failure and adapt.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("{0}")]
    ExecutionFailed(String),
}

//! Drover Engine Library
//!
//! This library provides the core functionality of the Drover task engine:
//! the polling worker, the bounded think-act reasoning loop, sandboxed tool
//! dispatch, ephemeral history caching, and per-task progress broadcast.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Database persistence module
pub mod db;

/// Permission guard for sandboxed tool actions
pub mod guard;

/// Completion provider abstraction layer
pub mod llm;

/// Reasoning loop and working-memory cache
pub mod agent;

/// Per-task notification broadcaster
pub mod notify;

/// Tool registry and built-in tools
pub mod tools;

/// Background worker loop
pub mod worker;

/// Telemetry and observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

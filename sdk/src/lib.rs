//! Drover SDK
//!
//! Shared library providing the task model, conversation types, notification
//! payloads, and error types used by the Drover engine and by external
//! components (API hosts, UIs) that consume its data.

/// Error types and handling
pub mod errors;

/// Notification event payloads
pub mod events;

/// Conversation messages and completion types
pub mod message;

/// Agent task model and status state machine
pub mod task;

// Re-export commonly used types
pub use errors::{EngineError, ToolError};
pub use events::TaskEvent;
pub use message::{CompletionResult, Message, MessageRole, ToolCall};
pub use task::{AgentTask, TaskStatus, DEFAULT_MAX_ITERATIONS};

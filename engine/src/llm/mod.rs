//! Completion provider abstraction layer
//!
//! The [`CompletionProvider`] trait is the engine's only view of the
//! upstream language model: given the conversation history and the
//! aggregate tool schemas, it returns model output and/or tool-call
//! requests. Concrete HTTP clients live outside this crate; embedding
//! hosts implement the trait and hand the provider to the worker. The
//! scripted [`FixtureProvider`] ships here for development and tests.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use sdk::{CompletionResult, EngineError, Message};

pub mod fixture;

pub use fixture::{FixtureProvider, FixtureStep};

/// Result type for completion operations
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Errors that can occur during a completion call
///
/// Any of these is fatal for the current task attempt: the reasoning loop
/// records the message and propagates without retrying.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

/// Upstream completion provider contract
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs and diagnostics
    fn name(&self) -> &str;

    /// Produce the next completion for a conversation.
    ///
    /// # Arguments
    /// * `history` - Conversation so far: system prompt, user goal,
    ///   assistant output, and tool results
    /// * `tool_schemas` - Serialized schemas of every dispatchable tool
    async fn get_completion(
        &self,
        history: &[Message],
        tool_schemas: &[String],
    ) -> Result<CompletionResult>;
}

/// Construct the provider selected by configuration.
///
/// Only the scripted fixture can be built from configuration alone; real
/// providers are implemented by the embedding host and passed to the
/// worker directly.
pub fn build_provider(config: &Config) -> std::result::Result<Arc<dyn CompletionProvider>, EngineError> {
    match config.llm.provider.as_str() {
        "scripted" => {
            let script_path = config.llm.script_path.as_deref().ok_or_else(|| {
                EngineError::Config(
                    "llm.script_path is required for the scripted provider".to_string(),
                )
            })?;
            let provider = FixtureProvider::from_file(script_path)?;
            Ok(Arc::new(provider))
        }
        other => Err(EngineError::Config(format!(
            "Unknown completion provider '{}'; implement CompletionProvider and wire it in the host",
            other
        ))),
    }
}

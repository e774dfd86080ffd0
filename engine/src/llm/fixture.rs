//! Scripted completion provider
//!
//! Replays a fixed sequence of responses, one per call. Used by the test
//! suite to drive the reasoning loop deterministically, and by `drover
//! serve` with `llm.provider = "scripted"` for local smoke runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::llm::{CompletionError, CompletionProvider, Result};
use sdk::{CompletionResult, EngineError, Message};

/// One scripted step: a canned response or a simulated provider failure
#[derive(Debug)]
pub enum FixtureStep {
    Respond(CompletionResult),
    Fail(String),
}

pub struct FixtureProvider {
    steps: Mutex<VecDeque<FixtureStep>>,
    calls: AtomicUsize,
}

impl FixtureProvider {
    /// Create a provider that replays the given steps in order
    pub fn new(steps: Vec<FixtureStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Convenience constructor for response-only scripts
    pub fn with_responses(responses: Vec<CompletionResult>) -> Self {
        Self::new(responses.into_iter().map(FixtureStep::Respond).collect())
    }

    /// Load a response script from a JSON file (array of completion
    /// results in the provider wire shape)
    pub fn from_file(path: &Path) -> std::result::Result<Self, EngineError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("Failed to read script {}: {}", path.display(), e))
        })?;
        let responses: Vec<CompletionResult> = serde_json::from_str(&contents).map_err(|e| {
            EngineError::Config(format!("Failed to parse script {}: {}", path.display(), e))
        })?;
        Ok(Self::with_responses(responses))
    }

    /// Number of completion calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for FixtureProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn get_completion(
        &self,
        _history: &[Message],
        _tool_schemas: &[String],
    ) -> Result<CompletionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let step = self
            .steps
            .lock()
            .expect("FixtureProvider lock poisoned")
            .pop_front();

        match step {
            Some(FixtureStep::Respond(result)) => Ok(result),
            Some(FixtureStep::Fail(message)) => Err(CompletionError::Other(message)),
            None => Err(CompletionError::ProviderUnavailable(
                "fixture script exhausted".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk::ToolCall;

    #[tokio::test]
    async fn test_replays_in_order() {
        let provider = FixtureProvider::with_responses(vec![
            CompletionResult::with_tool_calls("", vec![ToolCall::new("c1", "web_search", "{}")]),
            CompletionResult::answer("done"),
        ]);

        let first = provider.get_completion(&[], &[]).await.unwrap();
        assert!(first.has_tool_calls());

        let second = provider.get_completion(&[], &[]).await.unwrap();
        assert_eq!(second.content, "done");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let provider = FixtureProvider::new(vec![FixtureStep::Fail("boom".to_string())]);

        let err = provider.get_completion(&[], &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_exhausted_script_errors() {
        let provider = FixtureProvider::with_responses(Vec::new());

        let err = provider.get_completion(&[], &[]).await.unwrap_err();
        assert!(err.to_string().contains("exhausted"));
    }
}

//! Reasoning engine
//!
//! Executes the bounded think-act loop for one claimed task:
//!
//! 1. Load (or seed) the conversation history
//! 2. Think: call the completion provider with history + tool schemas
//! 3. No tool calls requested → the content is the final answer
//! 4. Act: dispatch each requested tool call, appending results to history
//! 5. Save history to the working-memory cache
//! 6. Report progress
//!
//! The loop runs at most `max_iterations` times. Tool failures never abort
//! it — they flow back to the model as error strings. Provider failures
//! are fatal for the attempt: recorded and propagated without retry. On
//! every exit path the cached history is cleared.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::HistoryCache;
use crate::db::TaskRepository;
use crate::llm::{CompletionError, CompletionProvider};
use crate::notify::TaskNotifier;
use crate::tools::ToolRegistry;
use sdk::{AgentTask, Message, TaskEvent, TaskStatus};

const SYSTEM_PROMPT: &str = "You are Drover, an autonomous agent. Work toward the user's goal \
step by step. Use the available tools when you need to act on the world; respond with plain \
text only when you have the final answer.";

/// Per-task execution context.
///
/// Constructed once per claimed task and passed explicitly through the
/// reasoning call chain, carrying the store, cache, notifier, and
/// cancellation handles.
pub struct TaskContext {
    pub repo: Arc<TaskRepository>,
    pub cache: Arc<HistoryCache>,
    pub notifier: Arc<TaskNotifier>,
    pub cancel: CancellationToken,
}

impl TaskContext {
    pub fn new(
        repo: Arc<TaskRepository>,
        cache: Arc<HistoryCache>,
        notifier: Arc<TaskNotifier>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            repo,
            cache,
            notifier,
            cancel,
        }
    }

    /// Progress callback: stamp the audit metadata and broadcast.
    pub async fn report_progress(&self, task: &mut AgentTask, message: String) {
        task.record_update();
        self.notifier
            .publish(TaskEvent::Progress {
                task_id: task.id,
                current_iteration: task.current_iteration,
                max_iterations: task.max_iterations,
                message,
                timestamp: chrono::Utc::now(),
            })
            .await;
    }
}

/// How the reasoning loop ended.
///
/// Only `Completed` is terminal from the engine's point of view; the
/// caller decides the final disposition of the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOutcome {
    /// The provider returned a final answer; the task result is populated
    Completed,

    /// The iteration budget ran out without a final answer
    Exhausted,

    /// The cancellation signal was observed between iterations
    Cancelled,
}

/// The think-act loop driver
pub struct ReasoningEngine {
    provider: Arc<dyn CompletionProvider>,
    tools: Arc<ToolRegistry>,
}

impl ReasoningEngine {
    pub fn new(provider: Arc<dyn CompletionProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self { provider, tools }
    }

    /// Execute the reasoning loop for one task.
    ///
    /// Mutates the in-memory task (iteration counter, status markers,
    /// result or error message); the caller is responsible for persisting
    /// it. The cached history is cleared on every exit path — success,
    /// exhaustion, provider failure, and cancellation alike.
    pub async fn execute(
        &self,
        task: &mut AgentTask,
        ctx: &TaskContext,
    ) -> Result<EngineOutcome, CompletionError> {
        info!("Starting task {}: {:?}", task.id, task.goal);

        let result = self.run_loop(task, ctx).await;
        ctx.cache.clear(task.id);
        result
    }

    async fn run_loop(
        &self,
        task: &mut AgentTask,
        ctx: &TaskContext,
    ) -> Result<EngineOutcome, CompletionError> {
        let mut history = ctx.cache.get(task.id);
        if history.is_empty() {
            history = seed_history(task);
        }

        let tool_schemas = self.tools.schemas();

        for iteration in 1..=task.max_iterations {
            task.current_iteration = iteration;

            if ctx.cancel.is_cancelled() {
                info!("Task {} observed cancellation", task.id);
                return Ok(EngineOutcome::Cancelled);
            }

            debug!(
                "Task {} iteration {}/{}",
                task.id, iteration, task.max_iterations
            );

            // Think
            task.status = TaskStatus::Thinking;
            let completion = match self.provider.get_completion(&history, &tool_schemas).await {
                Ok(completion) => completion,
                Err(e) => {
                    warn!("Completion provider failed for task {}: {}", task.id, e);
                    task.error_message.get_or_insert(e.to_string());
                    return Err(e);
                }
            };
            history.push(Message::assistant(&completion.content));

            // A response without tool calls is the final answer
            if !completion.has_tool_calls() {
                task.result = Some(completion.content);
                info!(
                    "Task {} completed after {} iteration(s)",
                    task.id, iteration
                );
                return Ok(EngineOutcome::Completed);
            }

            // Act
            task.status = TaskStatus::Acting;
            let call_count = completion.tool_calls.len();
            for call in &completion.tool_calls {
                debug!("Task {} dispatching tool '{}'", task.id, call.name);
                let output = self.tools.dispatch(&call.name, &call.arguments_json).await;
                history.push(Message::tool_result(output, &call.id));
            }

            ctx.cache.save(task.id, &history);
            ctx.report_progress(
                task,
                format!(
                    "Iteration {}/{}: dispatched {} tool call(s)",
                    iteration, task.max_iterations, call_count
                ),
            )
            .await;
        }

        warn!(
            "Task {} exhausted its iteration budget ({})",
            task.id, task.max_iterations
        );
        Ok(EngineOutcome::Exhausted)
    }
}

/// Fresh conversation for a task with no cached history
fn seed_history(task: &AgentTask) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(task.goal.clone().unwrap_or_default()),
    ]
}

//! Background worker loop
//!
//! Polls the task store for queued work, claims one task at a time, drives
//! the reasoning engine, persists the terminal status, and broadcasts
//! lifecycle events. Infrastructure failures (store unreachable) never
//! crash the loop: it retries after an exponential backoff with jitter.
//! The claim itself is an atomic conditional update in the repository, so
//! multiple worker processes can share one queue.

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::agent::{EngineOutcome, HistoryCache, ReasoningEngine, TaskContext};
use crate::config;
use crate::db::TaskRepository;
use crate::notify::TaskNotifier;
use sdk::TaskEvent;

/// Worker timing parameters
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Delay between polls when the queue is empty
    pub poll_interval: Duration,

    /// Initial backoff delay after an infrastructure error
    pub backoff_base: Duration,

    /// Upper bound for the doubling backoff delay
    pub backoff_max: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            backoff_base: Duration::from_secs(2),
            backoff_max: Duration::from_secs(60),
        }
    }
}

impl From<&config::WorkerConfig> for WorkerOptions {
    fn from(config: &config::WorkerConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            backoff_base: Duration::from_secs(config.backoff_base_secs),
            backoff_max: Duration::from_secs(config.backoff_max_secs),
        }
    }
}

/// The polling worker. Processes exactly one task at a time.
pub struct Worker {
    repo: Arc<TaskRepository>,
    cache: Arc<HistoryCache>,
    notifier: Arc<TaskNotifier>,
    engine: ReasoningEngine,
    options: WorkerOptions,
}

impl Worker {
    pub fn new(
        repo: Arc<TaskRepository>,
        cache: Arc<HistoryCache>,
        notifier: Arc<TaskNotifier>,
        engine: ReasoningEngine,
        options: WorkerOptions,
    ) -> Self {
        Self {
            repo,
            cache,
            notifier,
            engine,
            options,
        }
    }

    /// Run the poll loop until the cancellation token fires.
    ///
    /// Cancellation is observed between polls; an in-flight task sees the
    /// same token cooperatively at its iteration boundaries.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("Worker loop starting");

        let mut backoff = Backoff::new(self.options.backoff_base, self.options.backoff_max);

        while !cancel.is_cancelled() {
            match self.poll_once(&cancel).await {
                Ok(true) => {
                    // Processed a task; look for the next one immediately
                    backoff.reset();
                }
                Ok(false) => {
                    backoff.reset();
                    self.wait(self.options.poll_interval, &cancel).await;
                }
                Err(e) => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let delay = backoff.next_delay();
                    error!("Worker poll failed: {:#}. Retrying in {:?}", e, delay);
                    self.wait(delay, &cancel).await;
                }
            }
        }

        info!("Worker loop stopping");
    }

    /// Claim and execute at most one queued task.
    ///
    /// Returns whether a task was processed. Errors out of here are
    /// infrastructure failures only — task-level failures are folded into
    /// the task's own terminal state.
    async fn poll_once(&self, cancel: &CancellationToken) -> anyhow::Result<bool> {
        let Some(mut task) = self.repo.claim_next_queued().await? else {
            return Ok(false);
        };

        info!("Picked up task {}", task.id);
        self.notifier
            .publish(TaskEvent::Started {
                task_id: task.id,
                started_at: task.started_at.unwrap_or_else(Utc::now),
            })
            .await;

        let ctx = TaskContext::new(
            Arc::clone(&self.repo),
            Arc::clone(&self.cache),
            Arc::clone(&self.notifier),
            cancel.child_token(),
        );

        match self.engine.execute(&mut task, &ctx).await {
            Ok(EngineOutcome::Completed) => {
                task.complete();
            }
            Ok(EngineOutcome::Exhausted) => {
                warn!("Task {} hit its iteration limit", task.id);
                task.fail(format!(
                    "Task exceeded the maximum of {} iterations without a final answer",
                    task.max_iterations
                ));
            }
            Ok(EngineOutcome::Cancelled) => {
                info!("Task {} was cancelled", task.id);
                task.cancel();
            }
            Err(e) => {
                error!("Task {} failed: {}", task.id, e);
                task.fail(e.to_string());
            }
        }

        ctx.repo.save_task(&task).await?;
        self.notifier
            .publish(TaskEvent::Completed {
                task_id: task.id,
                result: task.result.clone(),
                error_message: task.error_message.clone(),
                completed_at: task.completed_at.unwrap_or_else(Utc::now),
            })
            .await;

        Ok(true)
    }

    /// Sleep that wakes early on cancellation
    async fn wait(&self, duration: Duration, cancel: &CancellationToken) {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(duration) => {}
        }
    }
}

/// Exponential backoff: doubles from base up to max, with up to 20% random
/// jitter applied to each delay.
struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            current: base,
        }
    }

    fn reset(&mut self) {
        self.current = self.base;
    }

    fn next_delay(&mut self) -> Duration {
        let jitter = rand::thread_rng().gen_range(1.0..1.2);
        let delay = self.current.mul_f64(jitter);
        self.current = (self.current * 2).min(self.max);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let mut backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(10));

        // Undo jitter by inspecting the internal schedule
        backoff.next_delay();
        assert_eq!(backoff.current, Duration::from_secs(4));
        backoff.next_delay();
        assert_eq!(backoff.current, Duration::from_secs(8));
        backoff.next_delay();
        assert_eq!(backoff.current, Duration::from_secs(10));
        backoff.next_delay();
        assert_eq!(backoff.current, Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_jitter_bounds() {
        let mut backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(60));

        for _ in 0..100 {
            backoff.reset();
            let delay = backoff.next_delay();
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_millis(2400));
        }
    }

    #[test]
    fn test_backoff_reset() {
        let mut backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(60));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.current, Duration::from_secs(2));
    }

    #[test]
    fn test_options_from_config() {
        let config = config::WorkerConfig::default();
        let options = WorkerOptions::from(&config);
        assert_eq!(options.poll_interval, Duration::from_secs(1));
        assert_eq!(options.backoff_base, Duration::from_secs(2));
        assert_eq!(options.backoff_max, Duration::from_secs(60));
    }
}

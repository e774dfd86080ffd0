//! Agent task model and status state machine
//!
//! An [`AgentTask`] is the durable record of one long-running goal. The row
//! is owned by the task store; the engine mutates an in-memory copy that the
//! worker persists. Status transitions are monotonic: once a task reaches a
//! terminal state it never transitions again, and only audit metadata may
//! still change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default iteration budget for newly created tasks
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Task status state machine
///
/// `Queued → Running → {Thinking ⇄ Acting}* → {Completed | Failed | Cancelled}`
///
/// Queued and the terminal states are externally visible rest states;
/// Thinking and Acting are transient intra-iteration markers set on the
/// in-memory copy while the reasoning loop runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Thinking,
    Acting,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Thinking => "thinking",
            TaskStatus::Acting => "acting",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Parse the store's string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(TaskStatus::Queued),
            "running" => Some(TaskStatus::Running),
            "thinking" => Some(TaskStatus::Thinking),
            "acting" => Some(TaskStatus::Acting),
            "completed" => Some(TaskStatus::Completed),
            "failed" => Some(TaskStatus::Failed),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }

    /// True for Completed, Failed, and Cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single long-running agent task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTask {
    /// Opaque unique identity, immutable
    pub id: Uuid,

    /// Natural-language goal, immutable
    pub goal: Option<String>,

    /// Current position in the status state machine
    pub status: TaskStatus,

    /// Submitter, when known
    pub created_by_user_id: Option<String>,

    /// Final answer, set once on success
    pub result: Option<String>,

    /// Failure description, set once on failure
    pub error_message: Option<String>,

    /// Current think-act iteration (1-indexed while running, 0 before)
    pub current_iteration: u32,

    /// Iteration budget, fixed at creation
    pub max_iterations: u32,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_updated_at: Option<DateTime<Utc>>,

    /// Monotonically increasing audit counter
    pub update_count: u32,
}

impl AgentTask {
    /// Create a new queued task
    pub fn new(
        goal: impl Into<String>,
        created_by_user_id: Option<String>,
        max_iterations: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal: Some(goal.into()),
            status: TaskStatus::Queued,
            created_by_user_id,
            result: None,
            error_message: None,
            current_iteration: 0,
            max_iterations,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            last_updated_at: None,
            update_count: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Stamp the audit metadata for one progress update.
    ///
    /// Audit metadata is the only thing allowed to change on a terminal
    /// task, so this carries no terminal check.
    pub fn record_update(&mut self) {
        self.update_count += 1;
        self.last_updated_at = Some(Utc::now());
    }

    /// Finish successfully. The result must already be populated by the
    /// reasoning loop; this only moves the state machine.
    pub fn complete(&mut self) {
        self.finish(TaskStatus::Completed);
    }

    /// Finish as failed, recording the error. An error message that was
    /// already set (e.g. by the reasoning loop) is preserved.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.finish(TaskStatus::Failed) {
            self.error_message.get_or_insert(error.into());
        }
    }

    /// Finish as cancelled.
    pub fn cancel(&mut self) {
        self.finish(TaskStatus::Cancelled);
    }

    /// Enter a terminal state. Refuses to transition a task that is already
    /// terminal and reports whether the transition was applied.
    fn finish(&mut self, status: TaskStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        self.completed_at = Some(Utc::now());
        true
    }
}

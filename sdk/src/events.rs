//! Notification event payloads
//!
//! Lifecycle and progress events broadcast to per-task subscriber groups.
//! Delivery is best-effort; task correctness never depends on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events published for one task's subscriber group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TaskEvent {
    /// The worker claimed the task and execution began
    Started {
        task_id: Uuid,
        started_at: DateTime<Utc>,
    },

    /// One think-act iteration finished without a final answer
    Progress {
        task_id: Uuid,
        current_iteration: u32,
        max_iterations: u32,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// The task reached a terminal state
    Completed {
        task_id: Uuid,
        result: Option<String>,
        error_message: Option<String>,
        completed_at: DateTime<Utc>,
    },
}

impl TaskEvent {
    /// The task this event belongs to
    pub fn task_id(&self) -> Uuid {
        match self {
            TaskEvent::Started { task_id, .. }
            | TaskEvent::Progress { task_id, .. }
            | TaskEvent::Completed { task_id, .. } => *task_id,
        }
    }
}

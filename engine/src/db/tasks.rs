/// Task persistence operations
///
/// This module provides the repository for persisting tasks to the durable
/// store. All queries are parameterized. The store owns the task rows; the
/// engine mutates in-memory copies that the worker writes back through
/// [`TaskRepository::save_task`].
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use sdk::{AgentTask, TaskStatus};

const TASK_COLUMNS: &str = "id, goal, status, created_by_user_id, result, error_message, \
     current_iteration, max_iterations, created_at, started_at, completed_at, \
     last_updated_at, update_count";

/// Task repository for database operations
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    /// Create a new task repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a newly created task
    pub async fn create_task(&self, task: &AgentTask) -> Result<()> {
        sqlx::query(
            "INSERT INTO tasks (id, goal, status, created_by_user_id, result, error_message, \
             current_iteration, max_iterations, created_at, started_at, completed_at, \
             last_updated_at, update_count) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.to_string())
        .bind(task.goal.as_deref())
        .bind(task.status.as_str())
        .bind(task.created_by_user_id.as_deref())
        .bind(task.result.as_deref())
        .bind(task.error_message.as_deref())
        .bind(task.current_iteration as i64)
        .bind(task.max_iterations as i64)
        .bind(task.created_at.timestamp())
        .bind(task.started_at.map(|t| t.timestamp()))
        .bind(task.completed_at.map(|t| t.timestamp()))
        .bind(task.last_updated_at.map(|t| t.timestamp()))
        .bind(task.update_count as i64)
        .execute(&self.pool)
        .await
        .context("Failed to insert task")?;

        Ok(())
    }

    /// Claim the next queued task, transitioning it to Running.
    ///
    /// The claim is a single conditional update (compare-and-swap on
    /// status), so concurrent workers can never pick up the same task:
    /// whichever statement commits first flips the row out of `queued` and
    /// the loser's WHERE clause matches nothing. Selection order among
    /// queued tasks is unspecified.
    pub async fn claim_next_queued(&self) -> Result<Option<AgentTask>> {
        let now = Utc::now().timestamp();

        let row = sqlx::query(&format!(
            "UPDATE tasks SET status = ?, started_at = ?, last_updated_at = ? \
             WHERE id IN (SELECT id FROM tasks WHERE status = ? LIMIT 1) \
             AND status = ? \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(TaskStatus::Running.as_str())
        .bind(now)
        .bind(now)
        .bind(TaskStatus::Queued.as_str())
        .bind(TaskStatus::Queued.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to claim queued task")?;

        row.map(row_to_task).transpose()
    }

    /// Write back every mutable column of a task
    pub async fn save_task(&self, task: &AgentTask) -> Result<()> {
        sqlx::query(
            "UPDATE tasks SET status = ?, result = ?, error_message = ?, \
             current_iteration = ?, started_at = ?, completed_at = ?, \
             last_updated_at = ?, update_count = ? WHERE id = ?",
        )
        .bind(task.status.as_str())
        .bind(task.result.as_deref())
        .bind(task.error_message.as_deref())
        .bind(task.current_iteration as i64)
        .bind(task.started_at.map(|t| t.timestamp()))
        .bind(task.completed_at.map(|t| t.timestamp()))
        .bind(task.last_updated_at.map(|t| t.timestamp()))
        .bind(task.update_count as i64)
        .bind(task.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to save task")?;

        Ok(())
    }

    /// Get a task by ID
    pub async fn get_task(&self, task_id: Uuid) -> Result<Option<AgentTask>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
            .bind(task_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch task")?;

        row.map(row_to_task).transpose()
    }

    /// Get recent tasks (last N by creation time)
    pub async fn get_recent_tasks(&self, limit: i64) -> Result<Vec<AgentTask>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch recent tasks")?;

        rows.into_iter().map(row_to_task).collect()
    }
}

/// Map a database row to the task model
fn row_to_task(row: SqliteRow) -> Result<AgentTask> {
    let id: String = row.get("id");
    let status: String = row.get("status");

    Ok(AgentTask {
        id: Uuid::parse_str(&id).with_context(|| format!("Invalid task id in store: {}", id))?,
        goal: row.get("goal"),
        status: TaskStatus::parse(&status)
            .ok_or_else(|| anyhow!("Unknown task status in store: {}", status))?,
        created_by_user_id: row.get("created_by_user_id"),
        result: row.get("result"),
        error_message: row.get("error_message"),
        current_iteration: row.get::<i64, _>("current_iteration") as u32,
        max_iterations: row.get::<i64, _>("max_iterations") as u32,
        created_at: epoch_to_datetime(row.get("created_at"))?,
        started_at: opt_epoch_to_datetime(row.get("started_at"))?,
        completed_at: opt_epoch_to_datetime(row.get("completed_at"))?,
        last_updated_at: opt_epoch_to_datetime(row.get("last_updated_at"))?,
        update_count: row.get::<i64, _>("update_count") as u32,
    })
}

fn epoch_to_datetime(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| anyhow!("Invalid timestamp in store: {}", secs))
}

fn opt_epoch_to_datetime(secs: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    secs.map(epoch_to_datetime).transpose()
}

/// Durable task store backed by SQLite
///
/// The store owns the task rows; everything else in the engine works on
/// in-memory copies and writes them back through the repository. sqlx is
/// used with parameterized queries only, and the database runs in WAL
/// mode so a polling worker and a submitting CLI can share one file.
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use tracing::{debug, info};

pub mod tasks;

// Re-export commonly used types
pub use tasks::TaskRepository;

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if necessary) the database at the given path and
    /// bring its schema up to date.
    ///
    /// WAL mode recovers automatically from unclean shutdowns when the
    /// file is reopened, so there is no separate recovery step.
    pub async fn new(db_path: &Path) -> Result<Self> {
        info!("Initializing database at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        debug!("Database connection established");

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Apply the embedded schema migrations. Safe to run repeatedly.
    async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::raw_sql(include_str!("../../migrations/001_tasks.sql"))
            .execute(&self.pool)
            .await
            .context("Failed to execute migration 001_tasks.sql")?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// The connection pool, for repositories to query against
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, checkpointing the WAL.
    ///
    /// Call during graceful shutdown so pending writes reach the main
    /// database file.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Database connection closed");
    }
}

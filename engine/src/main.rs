// Drover Task Engine
// Main entry point for the drover binary

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use drover_engine::agent::{HistoryCache, ReasoningEngine};
use drover_engine::cli::{Cli, Command};
use drover_engine::config::Config;
use drover_engine::db::{Database, TaskRepository};
use drover_engine::guard::PermissionGuard;
use drover_engine::llm::build_provider;
use drover_engine::notify::TaskNotifier;
use drover_engine::telemetry;
use drover_engine::tools::builtin_registry;
use drover_engine::worker::{Worker, WorkerOptions};
use sdk::AgentTask;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // The --log flag wins over the config file; RUST_LOG beats both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    telemetry::init(log_level);

    match cli.command {
        Command::Serve => serve(&config).await,
        Command::Submit {
            goal,
            user,
            max_iterations,
        } => submit(&config, goal, user, max_iterations).await,
        Command::History { limit } => history(&config, limit, cli.json).await,
        Command::Show { task_id } => show(&config, &task_id, cli.json).await,
    }
}

/// Run the worker loop until ctrl-c
async fn serve(config: &Config) -> anyhow::Result<()> {
    let db = Database::new(&config.db_path()).await?;
    let repo = Arc::new(TaskRepository::new(db.pool().clone()));

    let guard = Arc::new(PermissionGuard::new(
        config.core.workspace.clone(),
        config.security.command_blacklist.clone(),
    )?);
    let tools = Arc::new(builtin_registry(config, &guard)?);
    let provider = build_provider(config)?;

    let cache = Arc::new(HistoryCache::with_ttl(Duration::from_secs(
        config.agent.cache_ttl_secs,
    )));
    let notifier = Arc::new(TaskNotifier::new());
    let engine = ReasoningEngine::new(provider, tools);
    let worker = Worker::new(
        Arc::clone(&repo),
        cache,
        notifier,
        engine,
        WorkerOptions::from(&config.worker),
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            signal_cancel.cancel();
        }
    });

    println!("Drover worker running (workspace: {})", config.core.workspace.display());
    worker.run(cancel).await;

    db.close().await;
    Ok(())
}

/// Queue a new task
async fn submit(
    config: &Config,
    goal: String,
    user: Option<String>,
    max_iterations: Option<u32>,
) -> anyhow::Result<()> {
    let db = Database::new(&config.db_path()).await?;
    let repo = TaskRepository::new(db.pool().clone());

    let task = AgentTask::new(
        goal,
        user,
        max_iterations.unwrap_or(config.agent.max_iterations),
    );
    repo.create_task(&task).await?;

    println!("Queued task {}", task.id);
    db.close().await;
    Ok(())
}

/// List recent tasks
async fn history(config: &Config, limit: i64, json: bool) -> anyhow::Result<()> {
    let db = Database::new(&config.db_path()).await?;
    let repo = TaskRepository::new(db.pool().clone());

    let tasks = repo.get_recent_tasks(limit).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else if tasks.is_empty() {
        println!("No tasks found.");
    } else {
        for task in tasks {
            println!(
                "{}  {:<10} {}/{}  {}",
                task.id,
                task.status,
                task.current_iteration,
                task.max_iterations,
                task.goal.as_deref().unwrap_or("-")
            );
        }
    }

    db.close().await;
    Ok(())
}

/// Display one task in full
async fn show(config: &Config, task_id: &str, json: bool) -> anyhow::Result<()> {
    let id = Uuid::parse_str(task_id).context("Invalid task id")?;

    let db = Database::new(&config.db_path()).await?;
    let repo = TaskRepository::new(db.pool().clone());

    match repo.get_task(id).await? {
        None => println!("Task {} not found.", id),
        Some(task) if json => println!("{}", serde_json::to_string_pretty(&task)?),
        Some(task) => {
            println!("Task:        {}", task.id);
            println!("Goal:        {}", task.goal.as_deref().unwrap_or("-"));
            println!("Status:      {}", task.status);
            println!(
                "Iterations:  {}/{}",
                task.current_iteration, task.max_iterations
            );
            if let Some(result) = &task.result {
                println!("Result:      {}", result);
            }
            if let Some(error) = &task.error_message {
                println!("Error:       {}", error);
            }
            println!("Created:     {}", task.created_at);
            if let Some(completed) = task.completed_at {
                println!("Completed:   {}", completed);
            }
            println!("Updates:     {}", task.update_count);
        }
    }

    db.close().await;
    Ok(())
}

//! CLI interface for Drover
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for controlling the Drover
//! worker and submitting tasks.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drover task engine
///
/// A background engine that executes long-lived, goal-directed agent tasks:
/// it claims queued work, runs a bounded think-act loop against a
/// completion provider, and invokes sandboxed tools on the task's behalf.
#[derive(Parser, Debug)]
#[command(name = "drover")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the task worker until interrupted
    Serve,

    /// Queue a new agent task
    Submit {
        /// The goal to work toward
        goal: String,

        /// Submitting user id recorded on the task
        #[arg(long, value_name = "USER")]
        user: Option<String>,

        /// Override the default iteration budget
        #[arg(long, value_name = "N")]
        max_iterations: Option<u32>,
    },

    /// Show recent tasks
    History {
        /// Number of tasks to show (default: 10)
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },

    /// Show a single task
    Show {
        /// Task ID to display
        task_id: String,
    },
}

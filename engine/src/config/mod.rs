//! Configuration management
//!
//! This module handles loading, validation, and management of the Drover
//! configuration. Configuration is stored in TOML format at
//! ~/.drover/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Workspace path, log level, data directory
//! - **worker**: Poll interval and backoff bounds
//! - **agent**: Iteration budget and history cache TTL
//! - **tools**: Built-in tool enablement flags
//! - **security**: Shell command blacklist
//! - **llm**: Completion provider selection
//!
//! # Path Expansion
//!
//! The configuration system automatically:
//! - Expands ~ to the user's home directory
//! - Creates the workspace directory if it doesn't exist
//! - Verifies the workspace is a directory

use sdk::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// This structure represents the complete Drover configuration loaded from
/// ~/.drover/config.toml. Every section falls back to its defaults when
/// absent from the file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Worker loop settings
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Reasoning loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Built-in tool enablement
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Security settings
    #[serde(default)]
    pub security: SecurityConfig,

    /// Completion provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Workspace directory path (supports ~ expansion)
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

/// Worker loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Delay between polls when the queue is empty (seconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Initial backoff delay after an infrastructure error (seconds)
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,

    /// Upper bound for the doubling backoff delay (seconds)
    #[serde(default = "default_backoff_max")]
    pub backoff_max_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            backoff_base_secs: default_backoff_base(),
            backoff_max_secs: default_backoff_max(),
        }
    }
}

/// Reasoning loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Iteration budget assigned to newly submitted tasks
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Sliding expiration window for cached history (seconds)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

/// Built-in tool enablement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Enable the filesystem tool
    #[serde(default = "default_true", rename = "file-system")]
    pub file_system: bool,

    /// Enable the shell command tool
    #[serde(default = "default_true", rename = "shell-command")]
    pub shell_command: bool,

    /// Enable the web search tool
    #[serde(default = "default_true", rename = "web-search")]
    pub web_search: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            file_system: true,
            shell_command: true,
            web_search: true,
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shell commands denied by leading token (case-insensitive)
    #[serde(default = "default_command_blacklist")]
    pub command_blacklist: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            command_blacklist: default_command_blacklist(),
        }
    }
}

/// Completion provider configuration
///
/// The engine consumes the provider behind a trait; the only provider this
/// binary can wire on its own is the scripted fixture used for development
/// and tests. Embedding hosts supply real providers programmatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name ("scripted" is the only built-in)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Response script for the scripted provider (JSON file)
    #[serde(default)]
    pub script_path: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            script_path: None,
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_workspace() -> PathBuf {
    PathBuf::from("~/.drover/workspace")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.drover")
}

fn default_poll_interval() -> u64 {
    1
}

fn default_backoff_base() -> u64 {
    2
}

fn default_backoff_max() -> u64 {
    60
}

fn default_max_iterations() -> u32 {
    sdk::DEFAULT_MAX_ITERATIONS
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_command_blacklist() -> Vec<String> {
    vec!["rm".to_string(), "sudo".to_string(), "chmod".to_string()]
}

fn default_provider() -> String {
    "scripted".to_string()
}

impl Config {
    /// Load configuration from the default location (~/.drover/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration. Validates the configuration after loading.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails (workspace path unusable)
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save it to the given path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        let mut config = Config::default();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Path to ~/.drover/config.toml
    fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(".drover").join("config.toml"))
    }

    /// Location of the SQLite database file
    pub fn db_path(&self) -> PathBuf {
        self.core.data_dir.join("drover.db")
    }

    /// Expand ~ in paths, create the workspace if missing, and verify it is
    /// a usable directory.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        self.core.workspace = expand_tilde(&self.core.workspace)?;
        self.core.data_dir = expand_tilde(&self.core.data_dir)?;

        if !self.core.workspace.exists() {
            fs::create_dir_all(&self.core.workspace).map_err(|e| {
                EngineError::Config(format!(
                    "Failed to create workspace {}: {}",
                    self.core.workspace.display(),
                    e
                ))
            })?;
        }

        if !self.core.workspace.is_dir() {
            return Err(EngineError::Config(format!(
                "Workspace is not a directory: {}",
                self.core.workspace.display()
            )));
        }

        if self.worker.backoff_max_secs < self.worker.backoff_base_secs {
            return Err(EngineError::Config(
                "worker.backoff_max_secs must be >= worker.backoff_base_secs".to_string(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(EngineError::Config(
                "agent.max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Expand a leading ~ to the user's home directory
fn expand_tilde(path: &Path) -> Result<PathBuf, EngineError> {
    let Some(s) = path.to_str() else {
        return Ok(path.to_path_buf());
    };

    if let Some(rest) = s.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(rest))
    } else if s == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

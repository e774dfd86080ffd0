//! Permission guard for sandboxed tool actions
//!
//! The guard provides two independent policies that tools consult before
//! acting. The dispatcher does not enforce them; every tool that touches
//! the filesystem or spawns commands is responsible for calling in here.
//!
//! # File access
//!
//! Target paths and the workspace root are both canonicalized, and access
//! is denied unless the canonical target stays inside the canonical root.
//! This defends against `../` traversal and symlink-style escapes.
//!
//! # Shell commands
//!
//! The leading token of a command is matched case-insensitively against a
//! configured blacklist, and commands containing `&&`, `||`, or `;` are
//! denied outright so a single-command intent cannot be chained around.

use sdk::EngineError;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Chaining operators that would smuggle extra commands past the
/// leading-token check
const CHAIN_OPERATORS: &[&str] = &["&&", "||", ";"];

#[derive(Debug)]
pub struct PermissionGuard {
    workspace: PathBuf,
    command_blacklist: Vec<String>,
}

impl PermissionGuard {
    /// Create a guard rooted at the given workspace.
    ///
    /// The workspace is canonicalized up front so containment checks
    /// compare canonical forms on both sides. Blacklist entries are
    /// lowercased once here; `check_command` lowercases the candidate.
    pub fn new(workspace: PathBuf, command_blacklist: Vec<String>) -> Result<Self, EngineError> {
        let workspace = workspace
            .canonicalize()
            .map_err(|e| EngineError::PathResolution(workspace.clone(), e.to_string()))?;

        Ok(Self {
            workspace,
            command_blacklist: command_blacklist
                .into_iter()
                .map(|c| c.to_lowercase())
                .collect(),
        })
    }

    /// The canonical workspace root
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Validate an existing path for access.
    ///
    /// Relative paths are resolved against the workspace. The result is the
    /// canonical path, guaranteed to be inside the workspace.
    pub fn check_path(&self, path: &Path) -> Result<PathBuf, EngineError> {
        let abs = self.absolutize(path);

        let canonical = abs
            .canonicalize()
            .map_err(|e| EngineError::PathResolution(abs.clone(), e.to_string()))?;

        if !canonical.starts_with(&self.workspace) {
            return Err(EngineError::PathOutsideWorkspace(canonical));
        }

        Ok(canonical)
    }

    /// Validate a path that may not exist yet (file creation).
    ///
    /// Canonicalizes the nearest existing ancestor, verifies it is inside
    /// the workspace, and rejects `..` in the not-yet-existing remainder.
    pub fn check_write_path(&self, path: &Path) -> Result<PathBuf, EngineError> {
        let abs = self.absolutize(path);

        if abs.exists() {
            return self.check_path(&abs);
        }

        // Walk up to the nearest existing ancestor, collecting the pending
        // components in reverse.
        let mut existing = abs.as_path();
        let mut pending: Vec<OsString> = Vec::new();
        while !existing.exists() {
            match (existing.file_name(), existing.parent()) {
                (Some(name), Some(parent)) => {
                    pending.push(name.to_os_string());
                    existing = parent;
                }
                // A missing path ending in `..` or with no parent left
                _ => return Err(EngineError::PathOutsideWorkspace(abs)),
            }
        }

        let canonical = existing
            .canonicalize()
            .map_err(|e| EngineError::PathResolution(existing.to_path_buf(), e.to_string()))?;

        if !canonical.starts_with(&self.workspace) {
            return Err(EngineError::PathOutsideWorkspace(abs));
        }

        // The pending components don't exist on disk, so they cannot be
        // canonicalized; refuse traversal through them instead.
        if pending.iter().any(|c| Path::new(c).components().any(|p| p == Component::ParentDir)) {
            return Err(EngineError::PathOutsideWorkspace(abs));
        }

        let mut resolved = canonical;
        for component in pending.iter().rev() {
            resolved.push(component);
        }
        Ok(resolved)
    }

    /// Validate a shell command string.
    ///
    /// Denies chaining operators anywhere in the string and blacklisted
    /// leading tokens (case-insensitive).
    pub fn check_command(&self, command: &str) -> Result<(), EngineError> {
        if CHAIN_OPERATORS.iter().any(|op| command.contains(op)) {
            return Err(EngineError::CommandChaining(command.to_string()));
        }

        let leading = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();

        if self.command_blacklist.iter().any(|b| *b == leading) {
            return Err(EngineError::CommandBlacklisted(leading));
        }

        Ok(())
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }
}

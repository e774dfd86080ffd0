//! Working-memory cache for task histories
//!
//! Ephemeral, TTL-bounded storage of conversation transcripts keyed by
//! task id. Entries hold the history serialized as a JSON message array
//! under `agent_history:<taskId>` keys, plus an explicit expiry instant
//! checked on every read — expiry never depends on the backing map's own
//! semantics. The cache is not authoritative: the durable task row is the
//! source of truth, and losing an entry only forces the next read to
//! reseed the conversation from scratch.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use sdk::Message;

/// Default sliding expiration window: 1 hour of inactivity
pub const DEFAULT_HISTORY_TTL: Duration = Duration::from_secs(3600);

struct CacheEntry {
    payload: String,
    expires_at: Instant,
}

pub struct HistoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl HistoryCache {
    /// Create a cache with the default 1-hour sliding TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_HISTORY_TTL)
    }

    /// Create a cache with a specific sliding TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn cache_key(task_id: Uuid) -> String {
        format!("agent_history:{}", task_id)
    }

    /// Load a task's history.
    ///
    /// Returns an empty sequence when no live entry exists — missing,
    /// expired, or undecodable entries all mean "start fresh".
    pub fn get(&self, task_id: Uuid) -> Vec<Message> {
        let key = Self::cache_key(task_id);
        let mut entries = self.entries.lock().expect("HistoryCache lock poisoned");

        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                match serde_json::from_str(&entry.payload) {
                    Ok(history) => {
                        debug!("Loaded cached history for task {}", task_id);
                        history
                    }
                    Err(e) => {
                        warn!("Discarding undecodable history for task {}: {}", task_id, e);
                        entries.remove(&key);
                        Vec::new()
                    }
                }
            }
            Some(_) => {
                debug!("Cached history for task {} expired", task_id);
                entries.remove(&key);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Overwrite a task's history and reset its sliding expiration window
    pub fn save(&self, task_id: Uuid, history: &[Message]) {
        let payload = match serde_json::to_string(history) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize history for task {}: {}", task_id, e);
                return;
            }
        };

        let mut entries = self.entries.lock().expect("HistoryCache lock poisoned");
        entries.insert(
            Self::cache_key(task_id),
            CacheEntry {
                payload,
                expires_at: Instant::now() + self.ttl,
            },
        );
        debug!("Saved history for task {}", task_id);
    }

    /// Remove a task's history immediately
    pub fn clear(&self, task_id: Uuid) {
        let mut entries = self.entries.lock().expect("HistoryCache lock poisoned");
        if entries.remove(&Self::cache_key(task_id)).is_some() {
            debug!("Cleared history for task {}", task_id);
        }
    }
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_returns_empty() {
        let cache = HistoryCache::new();
        assert!(cache.get(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_save_and_get_roundtrip() {
        let cache = HistoryCache::new();
        let task_id = Uuid::new_v4();

        let history = vec![
            Message::system("prompt"),
            Message::user("goal"),
            Message::tool_result("output", "call_1"),
        ];
        cache.save(task_id, &history);

        assert_eq!(cache.get(task_id), history);
    }

    #[test]
    fn test_save_overwrites_previous_entry() {
        let cache = HistoryCache::new();
        let task_id = Uuid::new_v4();

        cache.save(task_id, &[Message::user("first")]);
        cache.save(task_id, &[Message::user("first"), Message::assistant("second")]);

        assert_eq!(cache.get(task_id).len(), 2);
    }

    #[test]
    fn test_expired_entry_is_fresh_start() {
        let cache = HistoryCache::with_ttl(Duration::from_millis(20));
        let task_id = Uuid::new_v4();

        cache.save(task_id, &[Message::user("goal")]);
        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get(task_id).is_empty());
    }

    #[test]
    fn test_save_resets_the_window() {
        let cache = HistoryCache::with_ttl(Duration::from_millis(60));
        let task_id = Uuid::new_v4();

        cache.save(task_id, &[Message::user("goal")]);
        std::thread::sleep(Duration::from_millis(35));
        // Second write slides the window forward
        cache.save(task_id, &[Message::user("goal")]);
        std::thread::sleep(Duration::from_millis(35));

        assert!(!cache.get(task_id).is_empty());
    }

    #[test]
    fn test_clear_removes_entry() {
        let cache = HistoryCache::new();
        let task_id = Uuid::new_v4();

        cache.save(task_id, &[Message::user("goal")]);
        cache.clear(task_id);

        assert!(cache.get(task_id).is_empty());
    }

    #[test]
    fn test_entries_are_isolated_per_task() {
        let cache = HistoryCache::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        cache.save(a, &[Message::user("task a")]);

        assert!(cache.get(b).is_empty());
        cache.clear(b);
        assert!(!cache.get(a).is_empty());
    }
}

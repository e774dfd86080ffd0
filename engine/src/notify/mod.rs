//! Per-task notification broadcaster
//!
//! Fan-out of lifecycle and progress events to per-task subscriber groups.
//! A subscriber joins a task's group explicitly before receiving anything
//! for it; events for task A are never delivered to subscribers of task B.
//! Channels are bounded, and publishing is best-effort: full or closed
//! channels are logged and skipped so delivery problems can never leak
//! back into the worker or the reasoning loop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use sdk::TaskEvent;

/// Channel buffer size for each subscriber
const CHANNEL_BUFFER_SIZE: usize = 100;

/// Handle identifying one subscription within a task's group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Broadcaster with per-task topic isolation
pub struct TaskNotifier {
    groups: Mutex<HashMap<Uuid, HashMap<SubscriberId, mpsc::Sender<TaskEvent>>>>,
    next_id: AtomicU64,
}

impl TaskNotifier {
    pub fn new() -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Join a task's group.
    ///
    /// Returns the subscription handle and a receiver that will observe
    /// every event published for that task from now on.
    pub async fn subscribe(&self, task_id: Uuid) -> (SubscriberId, mpsc::Receiver<TaskEvent>) {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut groups = self.groups.lock().await;
        groups.entry(task_id).or_default().insert(id, tx);
        debug!("Subscriber {:?} joined group for task {}", id, task_id);

        (id, rx)
    }

    /// Leave a task's group
    pub async fn unsubscribe(&self, task_id: Uuid, subscriber: SubscriberId) {
        let mut groups = self.groups.lock().await;
        if let Some(group) = groups.get_mut(&task_id) {
            group.remove(&subscriber);
            if group.is_empty() {
                groups.remove(&task_id);
            }
            debug!("Subscriber {:?} left group for task {}", subscriber, task_id);
        }
    }

    /// Broadcast an event to its task's group.
    ///
    /// Best-effort: a subscriber whose channel is full loses this event, a
    /// subscriber whose receiver is gone is pruned from the group. Neither
    /// case is an error for the caller.
    pub async fn publish(&self, event: TaskEvent) {
        let task_id = event.task_id();
        let mut groups = self.groups.lock().await;

        let Some(group) = groups.get_mut(&task_id) else {
            return;
        };

        let mut dropped = Vec::new();
        for (id, tx) in group.iter() {
            match tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        "Subscriber {:?} of task {} is not keeping up; dropping event",
                        id, task_id
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    dropped.push(*id);
                }
            }
        }

        for id in dropped {
            group.remove(&id);
        }
        if group.is_empty() {
            groups.remove(&task_id);
        }
    }
}

impl Default for TaskNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn started(task_id: Uuid) -> TaskEvent {
        TaskEvent::Started {
            task_id,
            started_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_for_its_task() {
        let notifier = TaskNotifier::new();
        let task_id = Uuid::new_v4();

        let (_id, mut rx) = notifier.subscribe(task_id).await;
        notifier.publish(started(task_id)).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.task_id(), task_id);
    }

    #[tokio::test]
    async fn test_groups_are_isolated() {
        let notifier = TaskNotifier::new();
        let task_a = Uuid::new_v4();
        let task_b = Uuid::new_v4();

        let (_id, mut rx_a) = notifier.subscribe(task_a).await;
        notifier.publish(started(task_b)).await;
        notifier.publish(started(task_a)).await;

        // The only event observed is task A's own
        let event = rx_a.recv().await.unwrap();
        assert_eq!(event.task_id(), task_a);
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_all_receive() {
        let notifier = TaskNotifier::new();
        let task_id = Uuid::new_v4();

        let (_a, mut rx_a) = notifier.subscribe(task_id).await;
        let (_b, mut rx_b) = notifier.subscribe(task_id).await;
        notifier.publish(started(task_id)).await;

        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_unsubscribed_receives_nothing() {
        let notifier = TaskNotifier::new();
        let task_id = Uuid::new_v4();

        let (id, mut rx) = notifier.subscribe(task_id).await;
        notifier.unsubscribe(task_id, id).await;
        notifier.publish(started(task_id)).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_noop() {
        let notifier = TaskNotifier::new();
        notifier.publish(started(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned() {
        let notifier = TaskNotifier::new();
        let task_id = Uuid::new_v4();

        let (_id, rx) = notifier.subscribe(task_id).await;
        drop(rx);

        // First publish prunes the dead subscriber; the group disappears
        notifier.publish(started(task_id)).await;
        assert!(notifier.groups.lock().await.get(&task_id).is_none());
    }
}

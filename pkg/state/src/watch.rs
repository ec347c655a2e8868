use pkg_constants::state::EVENT_BROADCAST_CAPACITY;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

/// Type of event in the watch stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Put,
    Delete,
}

/// A single watch event representing a state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent {
    pub seq: u64,
    pub event_type: EventType,
    pub key: String,
    /// Encoded object for `Put`, `None` for `Delete`.
    #[serde(default)]
    pub value: Option<Vec<u8>>,
}

/// In-memory log of store mutations with monotonic sequence numbers.
///
/// Recent events are retained for replay; live events are fanned out to
/// every subscriber. The cache sync task is the main consumer.
#[derive(Clone)]
pub struct EventLog {
    inner: Arc<RwLock<EventLogInner>>,
    sender: broadcast::Sender<WatchEvent>,
}

struct EventLogInner {
    seq: u64,
    recent: VecDeque<WatchEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(EVENT_BROADCAST_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(EventLogInner {
                seq: 0,
                recent: VecDeque::with_capacity(capacity),
                capacity,
            })),
            sender,
        }
    }

    /// Record a mutation. Called by `StateStore` after a successful write.
    pub async fn emit(&self, event_type: EventType, key: String, value: Option<Vec<u8>>) -> u64 {
        let mut inner = self.inner.write().await;
        inner.seq += 1;
        let event = WatchEvent {
            seq: inner.seq,
            event_type,
            key,
            value,
        };
        if inner.recent.len() >= inner.capacity {
            inner.recent.pop_front();
        }
        inner.recent.push_back(event.clone());
        // No subscribers is fine.
        let _ = self.sender.send(event);
        inner.seq
    }

    pub async fn current_seq(&self) -> u64 {
        self.inner.read().await.seq
    }

    /// Retained events newer than `from_seq` whose key starts with `prefix`.
    pub async fn events_since(&self, from_seq: u64, prefix: &str) -> Vec<WatchEvent> {
        let inner = self.inner.read().await;
        inner
            .recent
            .iter()
            .filter(|e| e.seq > from_seq && e.key.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WatchEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequence_numbers_increase() {
        let log = EventLog::new(8);
        assert_eq!(log.emit(EventType::Put, "/registry/quotas/a/b".into(), None).await, 1);
        assert_eq!(log.emit(EventType::Delete, "/registry/quotas/a/b".into(), None).await, 2);
        assert_eq!(log.current_seq().await, 2);
    }

    #[tokio::test]
    async fn retains_only_capacity_events() {
        let log = EventLog::new(2);
        for i in 0..5 {
            log.emit(EventType::Put, format!("/registry/shoots/ns/s{}", i), None)
                .await;
        }
        let events = log.events_since(0, "/registry/").await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].seq, 4);
        assert_eq!(events[1].seq, 5);
    }

    #[tokio::test]
    async fn filters_by_prefix_and_sequence() {
        let log = EventLog::new(16);
        log.emit(EventType::Put, "/registry/shoots/ns/a".into(), None).await;
        log.emit(EventType::Put, "/registry/quotas/ns/q".into(), None).await;
        log.emit(EventType::Put, "/registry/shoots/ns/b".into(), None).await;

        let shoots = log.events_since(1, "/registry/shoots/").await;
        assert_eq!(shoots.len(), 1);
        assert_eq!(shoots[0].key, "/registry/shoots/ns/b");
    }

    #[tokio::test]
    async fn subscribers_receive_live_events() {
        let log = EventLog::new(4);
        let mut rx = log.subscribe();
        log.emit(EventType::Put, "/registry/quotas/ns/q".into(), Some(vec![1]))
            .await;
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::Put);
        assert_eq!(event.value, Some(vec![1]));
    }
}

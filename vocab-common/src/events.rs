//! Event types for the vocabulary service
//!
//! After a successful mutation the server tells clients which cached views
//! became stale. Events travel over a broadcast [`EventBus`] and are
//! serialized for SSE transmission.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Path of the per-user vocabulary listing view
pub const VOCABULARY_LIST_PATH: &str = "/vocabulary";

/// Path of a single vocabulary detail view
pub fn vocabulary_detail_path(id: &uuid::Uuid) -> String {
    format!("{}/{}", VOCABULARY_LIST_PATH, id)
}

/// Vocabulary service events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VocabEvent {
    /// A cached view belonging to `user_id` must be refetched
    ViewInvalidated {
        /// Owner of the invalidated view
        user_id: String,
        /// View path, e.g. `/vocabulary` or `/vocabulary/{id}`
        path: String,
        /// When the invalidation was issued
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl VocabEvent {
    /// Build a `ViewInvalidated` event stamped with the current time
    pub fn view_invalidated(user_id: &str, path: impl Into<String>) -> Self {
        VocabEvent::ViewInvalidated {
            user_id: user_id.to_string(),
            path: path.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Event type name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            VocabEvent::ViewInvalidated { .. } => "ViewInvalidated",
        }
    }

    /// Owner of the event
    pub fn user_id(&self) -> &str {
        match self {
            VocabEvent::ViewInvalidated { user_id, .. } => user_id,
        }
    }
}

/// Broadcast bus for [`VocabEvent`]s
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VocabEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use vocab_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(64);
    /// assert_eq!(event_bus.capacity(), 64);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<VocabEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: VocabEvent) {
        let _ = self.tx.send(event);
    }

    /// Tell subscribers that the user's listing view is stale
    pub fn invalidate_list(&self, user_id: &str) {
        self.emit_lossy(VocabEvent::view_invalidated(user_id, VOCABULARY_LIST_PATH));
    }

    /// Tell subscribers that the listing and one detail view are stale
    pub fn invalidate_record(&self, user_id: &str, id: &uuid::Uuid) {
        self.invalidate_list(user_id);
        self.emit_lossy(VocabEvent::view_invalidated(user_id, vocabulary_detail_path(id)));
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_record_emits_list_then_detail() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let id = uuid::Uuid::new_v4();

        bus.invalidate_record("user-1", &id);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        match (first, second) {
            (
                VocabEvent::ViewInvalidated { path: p1, user_id: u1, .. },
                VocabEvent::ViewInvalidated { path: p2, .. },
            ) => {
                assert_eq!(u1, "user-1");
                assert_eq!(p1, "/vocabulary");
                assert_eq!(p2, format!("/vocabulary/{}", id));
            }
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.invalidate_list("nobody");
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = VocabEvent::view_invalidated("u", "/vocabulary");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ViewInvalidated");
        assert_eq!(json["path"], "/vocabulary");
    }
}

//! Event types for the twmod event system
//!
//! Every session mutation publishes a full `SessionSnapshot`. Observers never
//! receive deltas, so a late joiner only needs one snapshot to be in sync.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::Language;

/// Tweet author fields, passed through untouched from upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Numeric upstream account id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Handle without the leading marker
    pub screen_name: String,
    /// Avatar reference
    pub profile_image_url: Option<String>,
}

/// A moderated tweet
///
/// Immutable once created by the engine. `id` is process-local and only
/// unique within the current session (it restarts after a clear).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: u64,
    pub text: String,
    pub author: Author,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

/// Full state of the moderation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Tracked topic, always carrying a leading `#` (empty before first track)
    pub topic: String,
    /// Upstream language filter
    pub language: Option<Language>,
    /// Whether an upstream subscription is open
    pub watching: bool,
    /// Whether incoming tweets are auto-routed
    pub adaptive_enabled: bool,
    /// Unreviewed tweets, oldest first
    pub pending: Vec<Tweet>,
    /// Approved tweets, newest first
    pub approved: Vec<Tweet>,
    /// Rejected tweets, newest first
    pub rejected: Vec<Tweet>,
}

impl SessionSnapshot {
    /// Locate a tweet in any queue (test and UI convenience)
    pub fn find(&self, id: u64) -> Option<&Tweet> {
        self.pending
            .iter()
            .chain(self.approved.iter())
            .chain(self.rejected.iter())
            .find(|t| t.id == id)
    }

    /// Total number of tweets across all queues
    pub fn total(&self) -> usize {
        self.pending.len() + self.approved.len() + self.rejected.len()
    }
}

/// twmod event types
///
/// Serialized with a `type` tag for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModerationEvent {
    /// Sent once to a newly connected observer
    Init { snapshot: SessionSnapshot },

    /// Session state changed
    Change { snapshot: SessionSnapshot },
}

impl ModerationEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            ModerationEvent::Init { .. } => "init",
            ModerationEvent::Change { .. } => "change",
        }
    }

    /// Snapshot carried by the event
    pub fn snapshot(&self) -> &SessionSnapshot {
        match self {
            ModerationEvent::Init { snapshot } | ModerationEvent::Change { snapshot } => snapshot,
        }
    }
}

/// Broadcast bus for session events
///
/// Thin wrapper over a tokio broadcast channel. Slow receivers lag and drop
/// old events rather than blocking the engine.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ModerationEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use twmod_common::events::EventBus;
    ///
    /// let bus = EventBus::new(100);
    /// assert_eq!(bus.subscriber_count(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ModerationEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ModerationEvent,
    ) -> Result<usize, broadcast::error::SendError<ModerationEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case
    pub fn emit_lossy(&self, event: ModerationEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_snapshot() -> SessionSnapshot {
        SessionSnapshot {
            topic: "#rust".to_string(),
            language: Some(Language::En),
            watching: true,
            adaptive_enabled: false,
            pending: Vec::new(),
            approved: Vec::new(),
            rejected: Vec::new(),
        }
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = ModerationEvent::Change {
            snapshot: empty_snapshot(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "change");
        assert_eq!(json["snapshot"]["topic"], "#rust");
        assert_eq!(json["snapshot"]["language"], "en");
        assert_eq!(event.event_type(), "change");
    }

    #[tokio::test]
    async fn test_event_bus_delivers_to_subscribers() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        let sent = bus
            .emit(ModerationEvent::Change {
                snapshot: empty_snapshot(),
            })
            .unwrap();
        assert_eq!(sent, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.snapshot().topic, "#rust");
    }

    #[test]
    fn test_emit_without_subscribers_is_error_but_lossy_is_not() {
        let bus = EventBus::new(10);
        assert!(bus
            .emit(ModerationEvent::Change {
                snapshot: empty_snapshot(),
            })
            .is_err());
        bus.emit_lossy(ModerationEvent::Change {
            snapshot: empty_snapshot(),
        });
    }
}

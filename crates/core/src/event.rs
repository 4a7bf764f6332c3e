//! Status notifications: progress events for the host UI.
//!
//! The router publishes status events while it works. Delivery is
//! fire-and-forget: the pipeline never waits for an acknowledgment and
//! never fails because a notification could not be delivered.

use crate::error::NotifyError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// A notification record, serialized as
/// `{"type": "status", "data": {"description": ..., "done": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StatusEvent {
    Status(StatusData),
}

/// Payload of a status event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusData {
    /// Human-readable progress line
    pub description: String,

    /// Whether this is the last event of the invocation
    pub done: bool,

    /// When the event was produced
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    /// Build a status event stamped with the current time.
    pub fn status(description: impl Into<String>, done: bool) -> Self {
        Self::Status(StatusData {
            description: description.into(),
            done,
            timestamp: Utc::now(),
        })
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Status(data) => &data.description,
        }
    }

    pub fn is_done(&self) -> bool {
        match self {
            Self::Status(data) => data.done,
        }
    }
}

/// Destination for status events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event. Callers log and ignore errors.
    async fn emit(&self, event: StatusEvent) -> Result<(), NotifyError>;
}

/// A broadcast-based event bus.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Publishing with
/// no subscribers is not an error.
pub struct EventBus {
    sender: broadcast::Sender<Arc<StatusEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: StatusEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<StatusEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EventSink for EventBus {
    async fn emit(&self, event: StatusEvent) -> Result<(), NotifyError> {
        self.publish(event);
        Ok(())
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn emit(&self, _event: StatusEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(StatusEvent::status("Searching...", false))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.description(), "Searching...");
        assert!(!event.is_done());
    }

    #[tokio::test]
    async fn event_bus_no_subscribers_doesnt_fail() {
        let bus = EventBus::new(16);
        assert!(bus.emit(StatusEvent::status("nobody", true)).await.is_ok());
    }

    #[test]
    fn status_event_wire_shape() {
        let event = StatusEvent::status("No matching knowledge base found.", true);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["data"]["description"], "No matching knowledge base found.");
        assert_eq!(json["data"]["done"], true);
    }

    #[test]
    fn status_event_accepts_missing_timestamp() {
        let raw = r#"{"type":"status","data":{"description":"x","done":false}}"#;
        let event: StatusEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.description(), "x");
    }
}

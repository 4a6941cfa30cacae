//! Device event plumbing.
//!
//! Decoding a report may produce at most one domain event ("battery alarm",
//! "button pressed"). Events are handed to an [`EventSink`] and forgotten:
//! delivery failures belong to the automation engine on the other side of
//! the boundary and never propagate back into a codec.

use std::sync::Arc;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::device::DeviceId;

/// Default channel capacity for the event bus.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// A device-scoped domain event.
///
/// Carries no payload beyond the device identity; subscribers look up any
/// state they need from the device-state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEvent {
    /// Event name, e.g. `"battery_alarm"` or `"btn1_double"`.
    pub name: String,
    /// Device the event originated from.
    pub device_id: DeviceId,
}

impl DeviceEvent {
    pub fn new(name: impl Into<String>, device_id: DeviceId) -> Self {
        Self {
            name: name.into(),
            device_id,
        }
    }
}

/// Metadata attached to every published event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
    /// Component that published the event.
    pub source: String,
}

impl EventMetadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}

/// Fire-and-forget outlet for device events.
///
/// Implementations must not block: the sink is called from the synchronous
/// report-dispatch path.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DeviceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn emit(&self, _event: DeviceEvent) {}
}

/// Sink that records events in memory, for tests and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<DeviceEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DeviceEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.name).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: DeviceEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

/// Broadcast event bus distributing device events to all subscribers.
///
/// Publishing is synchronous and never blocks; with no subscribers the
/// event is discarded, which is exactly the fire-and-forget contract.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<(DeviceEvent, EventMetadata)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// The capacity bounds how many events are buffered for slow subscribers.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish an event. Returns `true` if at least one subscriber saw it.
    pub fn publish(&self, event: DeviceEvent, source: impl Into<String>) -> bool {
        let metadata = EventMetadata::new(source);
        self.tx.send((event, metadata)).is_ok()
    }

    pub fn subscribe(&self) -> EventBusReceiver {
        EventBusReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: DeviceEvent) {
        self.publish(event, "codec");
    }
}

/// Receiver half of the event bus.
pub struct EventBusReceiver {
    rx: broadcast::Receiver<(DeviceEvent, EventMetadata)>,
}

impl EventBusReceiver {
    /// Receive the next event. Returns `None` when the bus is closed.
    pub async fn recv(&mut self) -> Option<(DeviceEvent, EventMetadata)> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                // Fell behind; skip the lost events and keep receiving.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<(DeviceEvent, EventMetadata)> {
        self.rx.try_recv().ok()
    }
}

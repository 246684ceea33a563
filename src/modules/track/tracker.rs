//! Tracking event sink.
//!
//! Handlers build a [`TrackingEvent`] and hand it to the [`Tracker`] held in
//! the application state. [`LoggingTracker`] writes events to the
//! [`TRACKING_TARGET`] log target, which the subscriber routes to its own
//! event log. [`MemoryTracker`]
//! keeps them in memory for tests.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::logging::TRACKING_TARGET;
use crate::metrics::track_event_emitted;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub username: String,
    pub session: String,
    pub ip: String,
    pub agent: String,
    pub host: String,
    pub path: String,
    pub page: Option<String>,
    pub course_id: String,
    pub org_id: String,
    /// Client supplied context, as sent by Segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingEvent {
    pub name: String,
    /// `browser`, `server` or a Segment source such as `mobile`.
    pub event_source: String,
    pub event: Value,
    pub context: EventContext,
    pub time: DateTime<Utc>,
}

pub trait Tracker: Send + Sync {
    fn emit(&self, event: TrackingEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTracker;

impl Tracker for LoggingTracker {
    fn emit(&self, event: TrackingEvent) {
        track_event_emitted(&event.event_source);
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(
                target: TRACKING_TARGET,
                name = %event.name,
                source = %event.event_source,
                event = %payload,
                "tracking event"
            ),
            Err(e) => tracing::error!(
                target: TRACKING_TARGET,
                name = %event.name,
                error = %e,
                "failed to serialize tracking event"
            ),
        }
    }
}

/// Collects emitted events.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    events: Mutex<Vec<TrackingEvent>>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Tracker for MemoryTracker {
    fn emit(&self, event: TrackingEvent) {
        track_event_emitted(&event.event_source);
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

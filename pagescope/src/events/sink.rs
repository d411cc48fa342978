//! Event sink trait and implementations.

use tracing::{debug, info, Level};

use super::ScrapeEvent;

/// Receives session lifecycle events.
///
/// Sinks are for observability only; the session never depends on what a
/// sink does with an event. Implementations must not block or panic.
pub trait EventSink: Send + Sync {
    /// Emits an event without blocking.
    fn try_emit(&self, event: ScrapeEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn try_emit(&self, _event: ScrapeEvent) {}
}

/// Writes events to `tracing`.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a logging sink at `level`. Levels other than DEBUG log at INFO.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    fn log_event(&self, event: &ScrapeEvent) {
        let data = event.data();
        if self.level == Level::DEBUG {
            debug!(event_type = event.event_type(), event_data = %data, "Event: {}", event.event_type());
        } else {
            info!(event_type = event.event_type(), event_data = %data, "Event: {}", event.event_type());
        }
    }
}

impl EventSink for LoggingEventSink {
    fn try_emit(&self, event: ScrapeEvent) {
        self.log_event(&event);
    }
}

/// Keeps every event in memory. Intended for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<ScrapeEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<ScrapeEvent> {
        self.events.read().clone()
    }

    /// Event type names in emission order.
    #[must_use]
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.read().iter().map(ScrapeEvent::event_type).collect()
    }

    /// Returns events whose type starts with `type_prefix`.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<ScrapeEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type().starts_with(type_prefix))
            .cloned()
            .collect()
    }

    /// Number of events collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventSink for CollectingEventSink {
    fn try_emit(&self, event: ScrapeEvent) {
        self.events.write().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn started(url: &str) -> ScrapeEvent {
        ScrapeEvent::FetchStarted {
            task_id: Uuid::new_v4(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_noop_and_logging_sinks_accept_events() {
        NoOpEventSink.try_emit(started("https://a.test"));
        LoggingEventSink::default().try_emit(started("https://a.test"));
        LoggingEventSink::debug().try_emit(ScrapeEvent::HistoryCleared);
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.try_emit(started("https://a.test"));
        sink.try_emit(ScrapeEvent::OutputSaved {
            path: "out.txt".to_string(),
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.event_types(), vec!["fetch.started", "output.saved"]);
    }

    #[test]
    fn test_collecting_sink_filter_and_clear() {
        let sink = CollectingEventSink::new();
        sink.try_emit(started("https://a.test"));
        sink.try_emit(ScrapeEvent::FetchFailed {
            task_id: Uuid::new_v4(),
            url: "https://a.test".to_string(),
            error: "HTTP error: status 500".to_string(),
        });
        sink.try_emit(ScrapeEvent::HistoryCleared);

        assert_eq!(sink.events_of_type("fetch.").len(), 2);
        assert_eq!(sink.events_of_type("history.").len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}

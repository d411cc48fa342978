//! Session lifecycle events.
//!
//! A [`Session`](crate::session::Session) reports what it does to an
//! [`EventSink`]. Events are observational; presentation updates travel
//! through session notifications instead.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use serde::Serialize;
use uuid::Uuid;

use crate::runner::TaskKind;

/// Something that happened in a session.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrapeEvent {
    FetchStarted {
        task_id: Uuid,
        url: String,
    },
    FetchSucceeded {
        task_id: Uuid,
        url: String,
        title: String,
    },
    FetchFailed {
        task_id: Uuid,
        url: String,
        error: String,
    },
    ExtractionStarted {
        task_id: Uuid,
        selector: String,
        document_id: Uuid,
    },
    ExtractionSucceeded {
        task_id: Uuid,
        selector: String,
        matches: usize,
    },
    ExtractionFailed {
        task_id: Uuid,
        selector: String,
        error: String,
    },
    /// A running task was asked to stop.
    CancelRequested {
        task_id: Uuid,
        kind: TaskKind,
        reason: String,
    },
    HistoryCleared,
    OutputSaved {
        path: String,
    },
    /// A non-fatal problem surfaced to the user.
    Notice {
        message: String,
    },
}

impl ScrapeEvent {
    /// Dotted event name, e.g. `fetch.started`.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::FetchStarted { .. } => "fetch.started",
            Self::FetchSucceeded { .. } => "fetch.succeeded",
            Self::FetchFailed { .. } => "fetch.failed",
            Self::ExtractionStarted { .. } => "extraction.started",
            Self::ExtractionSucceeded { .. } => "extraction.succeeded",
            Self::ExtractionFailed { .. } => "extraction.failed",
            Self::CancelRequested { .. } => "task.cancel_requested",
            Self::HistoryCleared => "history.cleared",
            Self::OutputSaved { .. } => "output.saved",
            Self::Notice { .. } => "session.notice",
        }
    }

    /// The event as JSON.
    #[must_use]
    pub fn data(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_data_is_tagged() {
        let id = Uuid::nil();
        let event = ScrapeEvent::ExtractionSucceeded {
            task_id: id,
            selector: "a".to_string(),
            matches: 3,
        };
        assert_eq!(
            event.data(),
            serde_json::json!({
                "type": "extraction_succeeded",
                "task_id": "00000000-0000-0000-0000-000000000000",
                "selector": "a",
                "matches": 3,
            })
        );
    }

    #[test]
    fn test_unit_variant_data() {
        assert_eq!(
            ScrapeEvent::HistoryCleared.data(),
            serde_json::json!({"type": "history_cleared"})
        );
    }
}

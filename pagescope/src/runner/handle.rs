//! Handles returned to the caller that started a task.

use std::sync::Arc;
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};
use uuid::Uuid;

use super::state::TaskKind;
use crate::cancellation::CancellationToken;
use crate::errors::ScrapeError;

/// A notification emitted by a running task, in emission order.
#[derive(Debug)]
pub enum TaskEvent<T> {
    /// Advisory progress, non-decreasing, `0..=100`.
    Progress(u8),
    /// Terminal success carrying the result payload.
    Succeeded(T),
    /// Terminal failure.
    Failed(ScrapeError),
}

impl<T> TaskEvent<T> {
    /// Returns true for `Succeeded` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Caller-side view of one background task.
///
/// Events are delivered in the order the worker emitted them, and exactly
/// one terminal event is delivered. After it, [`TaskHandle::next_event`]
/// returns `None`.
#[derive(Debug)]
pub struct TaskHandle<T> {
    id: Uuid,
    kind: TaskKind,
    events: UnboundedReceiver<TaskEvent<T>>,
    token: Arc<CancellationToken>,
    finished: bool,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(
        id: Uuid,
        kind: TaskKind,
        events: UnboundedReceiver<TaskEvent<T>>,
        token: Arc<CancellationToken>,
    ) -> Self {
        Self {
            id,
            kind,
            events,
            token,
            finished: false,
        }
    }

    /// Unique task id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The kind of work this task performs.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns true once the terminal event has been received.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Requests cancellation. The task ends with a single `Failed` event.
    ///
    /// Has no effect once the task has produced its terminal event.
    pub fn cancel(&self, reason: impl Into<String>) -> bool {
        !self.finished && self.token.cancel(reason)
    }

    /// Waits for the next event.
    pub async fn next_event(&mut self) -> Option<TaskEvent<T>> {
        if self.finished {
            return None;
        }
        let event = self.events.recv().await.unwrap_or_else(|| {
            TaskEvent::Failed(ScrapeError::Internal(format!(
                "{} worker stopped without a result",
                self.kind
            )))
        });
        self.finished = event.is_terminal();
        Some(event)
    }

    /// Returns the next event if one is already queued.
    pub fn try_next_event(&mut self) -> Option<TaskEvent<T>> {
        if self.finished {
            return None;
        }
        let event = match self.events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => TaskEvent::Failed(ScrapeError::Internal(format!(
                "{} worker stopped without a result",
                self.kind
            ))),
        };
        self.finished = event.is_terminal();
        Some(event)
    }

    /// Waits for the terminal event, discarding progress.
    pub async fn wait(mut self) -> Result<T, ScrapeError> {
        while let Some(event) = self.next_event().await {
            match event {
                TaskEvent::Progress(_) => {}
                TaskEvent::Succeeded(value) => return Ok(value),
                TaskEvent::Failed(err) => return Err(err),
            }
        }
        Err(ScrapeError::Internal(format!("{} already finished", self.kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle_with_events(events: Vec<TaskEvent<&'static str>>) -> TaskHandle<&'static str> {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in events {
            tx.send(event).unwrap();
        }
        TaskHandle::new(Uuid::new_v4(), TaskKind::Fetch, rx, Arc::new(CancellationToken::new()))
    }

    #[tokio::test]
    async fn test_events_stop_after_terminal() {
        let mut handle = handle_with_events(vec![
            TaskEvent::Progress(10),
            TaskEvent::Succeeded("done"),
            TaskEvent::Progress(99),
        ]);

        assert!(matches!(handle.next_event().await, Some(TaskEvent::Progress(10))));
        assert!(matches!(handle.next_event().await, Some(TaskEvent::Succeeded("done"))));
        assert!(handle.is_finished());
        assert!(handle.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_closed_channel_yields_single_failure() {
        let (tx, rx) = mpsc::unbounded_channel::<TaskEvent<()>>();
        drop(tx);
        let mut handle =
            TaskHandle::new(Uuid::new_v4(), TaskKind::Extraction, rx, Arc::new(CancellationToken::new()));

        match handle.next_event().await {
            Some(TaskEvent::Failed(ScrapeError::Internal(msg))) => {
                assert!(msg.contains("extraction"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(handle.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_wait_skips_progress() {
        let handle = handle_with_events(vec![
            TaskEvent::Progress(20),
            TaskEvent::Progress(50),
            TaskEvent::Succeeded("report"),
        ]);
        assert_eq!(handle.wait().await.unwrap(), "report");
    }

    #[test]
    fn test_try_next_event() {
        let (tx, rx) = mpsc::unbounded_channel::<TaskEvent<()>>();
        let mut handle =
            TaskHandle::new(Uuid::new_v4(), TaskKind::Fetch, rx, Arc::new(CancellationToken::new()));
        tx.send(TaskEvent::Progress(30)).unwrap();

        assert!(matches!(handle.try_next_event(), Some(TaskEvent::Progress(30))));
        assert!(handle.try_next_event().is_none());
        assert!(!handle.is_finished());

        drop(tx);
        assert!(matches!(handle.try_next_event(), Some(TaskEvent::Failed(_))));
        assert!(handle.is_finished());
    }

    #[test]
    fn test_cancel_after_finish_is_noop() {
        let mut handle = handle_with_events(vec![TaskEvent::Failed(ScrapeError::Internal(
            "boom".to_string(),
        ))]);
        assert!(handle.try_next_event().is_some());
        assert!(!handle.cancel("too late"));
    }
}

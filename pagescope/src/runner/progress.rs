//! Progress reporting from workers to the coordinating task.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use super::handle::TaskEvent;
use crate::errors::ScrapeError;

/// Receives advisory progress milestones from a running operation.
pub trait ProgressObserver: Send + Sync {
    /// Called with a percentage in `0..=100`.
    fn on_progress(&self, percent: u8);
}

/// Discards all progress. Used when an operation is called directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressObserver for NoOpProgress {
    fn on_progress(&self, _percent: u8) {}
}

struct ChannelState<T> {
    tx: UnboundedSender<TaskEvent<T>>,
    last: Option<u8>,
    closed: bool,
}

/// Ordered event channel for a single task.
///
/// Progress and the terminal event go through one lock, so progress can
/// never be delivered after the terminal event, and percentages never
/// decrease.
pub struct ProgressReporter<T> {
    inner: Arc<Mutex<ChannelState<T>>>,
}

impl<T> Clone for ProgressReporter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> ProgressReporter<T> {
    pub(crate) fn new(tx: UnboundedSender<TaskEvent<T>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChannelState {
                tx,
                last: None,
                closed: false,
            })),
        }
    }

    /// Sends the terminal event. Later calls are ignored.
    pub(crate) fn finish(&self, outcome: Result<T, ScrapeError>) -> bool {
        let mut state = self.inner.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        let event = match outcome {
            Ok(value) => TaskEvent::Succeeded(value),
            Err(err) => TaskEvent::Failed(err),
        };
        // The receiver may already be gone; nothing left to notify then.
        let _ = state.tx.send(event);
        true
    }

    /// Returns true once the terminal event has been sent.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl<T: Send + 'static> ProgressObserver for ProgressReporter<T> {
    fn on_progress(&self, percent: u8) {
        let percent = percent.min(100);
        let mut state = self.inner.lock();
        if state.closed {
            return;
        }
        if state.last.is_some_and(|last| percent <= last) {
            trace!(percent, "Dropping non-increasing progress");
            return;
        }
        state.last = Some(percent);
        let _ = state.tx.send(TaskEvent::Progress(percent));
    }
}

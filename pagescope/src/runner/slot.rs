//! Single-flight task slots.

use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::handle::TaskHandle;
use super::progress::{ProgressObserver, ProgressReporter};
use super::state::{TaskKind, TaskState};
use crate::cancellation::CancellationToken;
use crate::errors::ScrapeError;
use crate::observability::TaskTimer;

/// What a worker receives when its task starts.
pub struct TaskContext<T> {
    id: Uuid,
    reporter: ProgressReporter<T>,
    token: Arc<CancellationToken>,
}

impl<T: Send + 'static> TaskContext<T> {
    /// The task id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Reports a progress milestone.
    pub fn progress(&self, percent: u8) {
        self.reporter.on_progress(percent);
    }

    /// A shareable progress observer for handing to other components.
    #[must_use]
    pub fn observer(&self) -> Arc<dyn ProgressObserver> {
        Arc::new(self.reporter.clone())
    }

    /// The task's cancellation token.
    #[must_use]
    pub fn token(&self) -> Arc<CancellationToken> {
        self.token.clone()
    }
}

/// Guards one kind of operation so at most one runs at a time.
///
/// State machine: `Idle -> Running -> {Succeeded, Failed} -> Idle`. The slot
/// is back to `Idle` before the terminal event is delivered, so a receiver
/// may start the next task as soon as it sees the result.
#[derive(Debug, Clone)]
pub struct TaskSlot {
    kind: TaskKind,
    state: Arc<Mutex<TaskState>>,
}

impl TaskSlot {
    /// Creates an idle slot.
    #[must_use]
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(TaskState::Idle)),
        }
    }

    /// The kind of task this slot runs.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TaskState {
        *self.state.lock()
    }

    /// Returns true while a task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == TaskState::Running
    }

    /// Starts `work` on the tokio runtime.
    ///
    /// Rejected with [`ScrapeError::Busy`] while another task of this kind
    /// is running; the running task is not affected. Must be called from
    /// within a tokio runtime.
    pub fn spawn<T, F, Fut>(&self, work: F) -> Result<TaskHandle<T>, ScrapeError>
    where
        T: Send + 'static,
        F: FnOnce(TaskContext<T>) -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>> + Send + 'static,
    {
        {
            let mut state = self.state.lock();
            if *state == TaskState::Running {
                warn!(kind = %self.kind, "Rejected start: task already running");
                return Err(ScrapeError::Busy(self.kind));
            }
            *state = TaskState::Running;
        }

        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let reporter = ProgressReporter::new(tx);
        let token = Arc::new(CancellationToken::new());

        // Created before `work` runs so a panicking closure still frees the slot.
        let guard = RunningGuard {
            id,
            kind: self.kind,
            state: self.state.clone(),
            reporter: reporter.clone(),
            timer: TaskTimer::start(),
            settled: false,
        };
        let context = TaskContext {
            id,
            reporter,
            token: token.clone(),
        };
        let future = work(context);

        let worker_token = token.clone();

        info!(task_id = %id, kind = %self.kind, "Task started");
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = worker_token.cancelled() => Err(ScrapeError::Cancelled(
                    worker_token.reason().unwrap_or_else(|| "cancelled".to_string()),
                )),
                result = AssertUnwindSafe(future).catch_unwind() => result.unwrap_or_else(|_| {
                    Err(ScrapeError::Internal("worker panicked".to_string()))
                }),
            };
            guard.complete(outcome);
        });

        Ok(TaskHandle::new(id, self.kind, rx, token))
    }
}

/// Settles the slot exactly once, even if the worker task is dropped.
struct RunningGuard<T: Send + 'static> {
    id: Uuid,
    kind: TaskKind,
    state: Arc<Mutex<TaskState>>,
    reporter: ProgressReporter<T>,
    timer: TaskTimer,
    settled: bool,
}

impl<T: Send + 'static> RunningGuard<T> {
    fn complete(mut self, outcome: Result<T, ScrapeError>) {
        self.settle(outcome);
    }

    fn settle(&mut self, outcome: Result<T, ScrapeError>) {
        if self.settled {
            return;
        }
        self.settled = true;

        let terminal = if outcome.is_ok() {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        };
        {
            let mut state = self.state.lock();
            debug_assert!(state.can_transition_to(terminal));
            *state = terminal;
            let duration_ms = self.timer.elapsed_ms();
            match &outcome {
                Ok(_) => info!(task_id = %self.id, kind = %self.kind, duration_ms, "Task succeeded"),
                Err(err) => warn!(
                    task_id = %self.id,
                    kind = %self.kind,
                    duration_ms,
                    error = %err,
                    "Task failed"
                ),
            }
            *state = TaskState::Idle;
        }

        if !self.reporter.finish(outcome) {
            debug!(task_id = %self.id, "Terminal event already sent");
        }
    }
}

impl<T: Send + 'static> Drop for RunningGuard<T> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(Err(ScrapeError::Internal(format!(
                "{} worker was dropped before finishing",
                self.kind
            ))));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TaskEvent;
    use crate::testing::assert_single_terminal;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_success_emits_progress_then_result() {
        let slot = TaskSlot::new(TaskKind::Extraction);
        let mut handle = slot
            .spawn(|ctx| async move {
                ctx.progress(20);
                ctx.progress(50);
                ctx.progress(100);
                Ok::<_, ScrapeError>("report".to_string())
            })
            .unwrap();

        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }

        assert_eq!(events.len(), 4);
        assert_single_terminal(&events);
        assert!(matches!(events[0], TaskEvent::Progress(20)));
        assert!(matches!(events[2], TaskEvent::Progress(100)));
        assert!(matches!(&events[3], TaskEvent::Succeeded(r) if r == "report"));
        assert_eq!(slot.state(), TaskState::Idle);
    }

    #[tokio::test]
    async fn test_second_start_rejected_while_running() {
        let slot = TaskSlot::new(TaskKind::Fetch);
        let gate = Arc::new(Notify::new());

        let first = {
            let gate = gate.clone();
            slot.spawn(move |_ctx| async move {
                gate.notified().await;
                Ok::<_, ScrapeError>(1u32)
            })
            .unwrap()
        };
        assert!(slot.is_running());

        let second = slot.spawn(|_ctx| async { Ok::<_, ScrapeError>(2u32) });
        assert!(matches!(second, Err(ScrapeError::Busy(TaskKind::Fetch))));

        gate.notify_one();
        assert_eq!(first.wait().await.unwrap(), 1);
        assert!(!slot.is_running());

        let third = slot.spawn(|_ctx| async { Ok::<_, ScrapeError>(3u32) }).unwrap();
        assert_eq!(third.wait().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_failure_is_terminal() {
        let slot = TaskSlot::new(TaskKind::Fetch);
        let handle = slot
            .spawn(|ctx| async move {
                ctx.progress(10);
                Err::<(), _>(ScrapeError::Internal("boom".to_string()))
            })
            .unwrap();

        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Internal(ref m) if m == "boom"));
        assert_eq!(slot.state(), TaskState::Idle);
    }

    #[tokio::test]
    async fn test_cancel_running_task() {
        let slot = TaskSlot::new(TaskKind::Fetch);
        let mut handle = slot
            .spawn(|ctx| async move {
                ctx.progress(10);
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, ScrapeError>(())
            })
            .unwrap();

        assert!(matches!(handle.next_event().await, Some(TaskEvent::Progress(10))));
        assert!(handle.cancel("user pressed stop"));

        match handle.next_event().await {
            Some(TaskEvent::Failed(ScrapeError::Cancelled(reason))) => {
                assert_eq!(reason, "user pressed stop");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(handle.next_event().await.is_none());
        assert_eq!(slot.state(), TaskState::Idle);
    }

    #[test]
    fn test_panicking_closure_frees_slot() {
        let slot = TaskSlot::new(TaskKind::Fetch);
        let spawned = std::panic::catch_unwind(AssertUnwindSafe(|| {
            slot.spawn(|_ctx: TaskContext<()>| -> std::future::Ready<Result<(), ScrapeError>> {
                panic!("bad setup")
            })
        }));

        assert!(spawned.is_err());
        assert_eq!(slot.state(), TaskState::Idle);
    }

    #[tokio::test]
    async fn test_panicking_worker_reports_failure() {
        let slot = TaskSlot::new(TaskKind::Extraction);
        let handle = slot
            .spawn(|_ctx| async move {
                if true {
                    panic!("worker bug");
                }
                Ok::<_, ScrapeError>(())
            })
            .unwrap();

        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Internal(_)));
        assert!(!slot.is_running());
    }

    #[tokio::test]
    async fn test_slot_idle_before_terminal_delivered() {
        let slot = TaskSlot::new(TaskKind::Fetch);
        let mut handle = slot.spawn(|_ctx| async { Ok::<_, ScrapeError>(()) }).unwrap();

        while let Some(event) = handle.next_event().await {
            if event.is_terminal() {
                assert_eq!(slot.state(), TaskState::Idle);
            }
        }
    }
}

//! Background task execution with progress reporting.
//!
//! This module provides:
//! - [`TaskSlot`], a single-flight guard per kind of work
//! - [`TaskHandle`], the caller's ordered stream of [`TaskEvent`]s
//! - [`ProgressObserver`], the seam operations report milestones through

mod handle;
mod progress;
mod slot;
mod state;

pub use handle::{TaskEvent, TaskHandle};
pub use progress::{NoOpProgress, ProgressObserver, ProgressReporter};
pub use slot::{TaskContext, TaskSlot};
pub use state::{TaskKind, TaskState};

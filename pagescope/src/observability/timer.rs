//! Task timing.

use std::time::Instant;

/// Measures how long a background task ran.
#[derive(Debug, Clone, Copy)]
pub struct TaskTimer {
    start: Instant,
}

impl TaskTimer {
    /// Starts timing now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

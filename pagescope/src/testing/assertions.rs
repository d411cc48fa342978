//! Assertions over progress sequences.

use crate::runner::TaskEvent;

/// Panics unless `values` never decreases and stays within `0..=100`.
pub fn assert_monotonic(values: &[u8]) {
    for pair in values.windows(2) {
        assert!(
            pair[0] <= pair[1],
            "progress decreased from {} to {}: {values:?}",
            pair[0],
            pair[1]
        );
    }
    if let Some(last) = values.last() {
        assert!(*last <= 100, "progress above 100: {values:?}");
    }
}

/// Panics unless `events` ends with its only terminal event, with
/// monotonic progress before it.
pub fn assert_single_terminal<T: std::fmt::Debug>(events: &[TaskEvent<T>]) {
    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1, "expected one terminal event, got {events:?}");
    assert!(
        events.last().is_some_and(TaskEvent::is_terminal),
        "terminal event is not last: {events:?}"
    );
    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            TaskEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_monotonic(&progress);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_accepts_plateaus() {
        assert_monotonic(&[]);
        assert_monotonic(&[10, 30, 30, 100]);
    }

    #[test]
    #[should_panic(expected = "progress decreased")]
    fn test_monotonic_rejects_decrease() {
        assert_monotonic(&[50, 20]);
    }

    #[test]
    fn test_single_terminal() {
        assert_single_terminal(&[
            TaskEvent::Progress(20),
            TaskEvent::Progress(50),
            TaskEvent::Succeeded("ok"),
        ]);
    }

    #[test]
    #[should_panic(expected = "expected one terminal event")]
    fn test_single_terminal_rejects_missing_result() {
        assert_single_terminal::<()>(&[TaskEvent::Progress(20)]);
    }
}

//! Test helpers for code built on pagescope.
//!
//! This module provides:
//! - HTML fixtures with known selector results
//! - [`StubFetcher`], a scripted [`Fetcher`](crate::fetch::Fetcher)
//! - Assertions over task and session event streams

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_monotonic, assert_single_terminal};
pub use fixtures::{fetch_result, gallery_page, link_list_page, sample_page, SAMPLE_TITLE};
pub use mocks::{RecordingProgress, StubFetcher};

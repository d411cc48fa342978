//! The fetcher seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::request::FetchRequest;
use crate::errors::FetchError;
use crate::runner::ProgressObserver;

/// Title used when a page has no usable `<title>`.
pub const NO_TITLE: &str = "No title";

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Response body as text.
    pub raw_html: String,
    /// Page title, or [`NO_TITLE`].
    pub title: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status_code: u16,
}

impl FetchResult {
    /// Whether the page had a real title.
    #[must_use]
    pub fn has_title(&self) -> bool {
        self.title != NO_TITLE
    }
}

/// Protocol for HTTP fetching.
///
/// Milestones reported through `progress`: 10 once the request is built,
/// 30 when it is sent, 70 when the response arrives, 100 after the title
/// scan.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs one GET. Never retries.
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: Arc<dyn ProgressObserver>,
    ) -> Result<FetchResult, FetchError>;
}

//! Scripted fetchers and progress recorders.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

use super::fixtures::fetch_result;
use crate::errors::FetchError;
use crate::fetch::{FetchRequest, FetchResult, Fetcher};
use crate::runner::ProgressObserver;

#[derive(Debug, Clone)]
enum Scripted {
    Page(String),
    Fail(FetchError),
}

/// A [`Fetcher`] that answers from a script instead of the network.
///
/// Reports the same milestones as the HTTP fetcher. A gate, when set, holds
/// every fetch after the 30% milestone until it is notified.
#[derive(Debug)]
pub struct StubFetcher {
    default: Scripted,
    pages: HashMap<String, Scripted>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<FetchRequest>>,
}

impl StubFetcher {
    /// Serves `html` for every URL.
    #[must_use]
    pub fn ok(html: impl Into<String>) -> Self {
        Self::scripted(Scripted::Page(html.into()))
    }

    /// Fails every fetch with `error`.
    #[must_use]
    pub fn failing(error: FetchError) -> Self {
        Self::scripted(Scripted::Fail(error))
    }

    fn scripted(default: Scripted) -> Self {
        Self {
            default,
            pages: HashMap::new(),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serves `html` for the normalized `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Scripted::Page(html.into()));
        self
    }

    /// Fails fetches of the normalized `url`.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.pages.insert(url.into(), Scripted::Fail(error));
        self
    }

    /// Holds each fetch until `gate` is notified.
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Requests received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<FetchRequest> {
        self.calls.lock().clone()
    }

    /// Number of fetches performed.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: Arc<dyn ProgressObserver>,
    ) -> Result<FetchResult, FetchError> {
        self.calls.lock().push(request.clone());
        progress.on_progress(10);
        progress.on_progress(30);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let script = self
            .pages
            .get(request.url())
            .unwrap_or(&self.default)
            .clone();
        match script {
            Scripted::Page(html) => {
                progress.on_progress(70);
                let result = fetch_result(request.url(), &html);
                progress.on_progress(100);
                Ok(result)
            }
            Scripted::Fail(error) => Err(error),
        }
    }
}

/// Records every progress value it receives.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    values: Mutex<Vec<u8>>,
}

impl RecordingProgress {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Values in the order received.
    #[must_use]
    pub fn values(&self) -> Vec<u8> {
        self.values.lock().clone()
    }
}

impl ProgressObserver for RecordingProgress {
    fn on_progress(&self, percent: u8) {
        self.values.lock().push(percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::NoOpProgress;

    #[tokio::test]
    async fn test_stub_serves_scripted_pages() {
        let stub = StubFetcher::ok("<title>Default</title>")
            .with_page("https://special.test", "<title>Special</title>")
            .with_failure("https://down.test", FetchError::HttpStatus(503));

        let default = FetchRequest::new("anything.test", 5).unwrap();
        let special = FetchRequest::new("special.test", 5).unwrap();
        let down = FetchRequest::new("down.test", 5).unwrap();

        assert_eq!(
            stub.fetch(&default, Arc::new(NoOpProgress)).await.unwrap().title,
            "Default"
        );
        assert_eq!(
            stub.fetch(&special, Arc::new(NoOpProgress)).await.unwrap().title,
            "Special"
        );
        assert_eq!(
            stub.fetch(&down, Arc::new(NoOpProgress)).await.unwrap_err(),
            FetchError::HttpStatus(503)
        );
        assert_eq!(stub.call_count(), 3);
        assert_eq!(stub.calls()[1].url(), "https://special.test");
    }

    #[tokio::test]
    async fn test_stub_reports_milestones() {
        let stub = StubFetcher::ok("<p>x</p>");
        let recorder = Arc::new(RecordingProgress::new());
        let request = FetchRequest::new("a.test", 5).unwrap();

        stub.fetch(&request, recorder.clone()).await.unwrap();
        assert_eq!(recorder.values(), vec![10, 30, 70, 100]);
    }

    #[tokio::test]
    async fn test_gate_holds_fetch() {
        let gate = Arc::new(Notify::new());
        let stub = Arc::new(StubFetcher::ok("<p>x</p>").with_gate(gate.clone()));
        let request = FetchRequest::new("a.test", 5).unwrap();

        let task = {
            let stub = stub.clone();
            tokio::spawn(async move { stub.fetch(&request, Arc::new(NoOpProgress)).await })
        };
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        gate.notify_one();
        assert!(task.await.unwrap().is_ok());
    }
}

//! The interactive session: one current document, one history log and at
//! most one running task of each kind.
//!
//! A [`Session`] is owned by a single coordinating task (a REPL, a UI event
//! loop). Background work reports back through [`Session::next_notification`],
//! which also applies each result to the session state before handing it out.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ScraperConfig;
use crate::document::DocumentHost;
use crate::errors::{ScrapeError, ValidationError};
use crate::events::{EventSink, LoggingEventSink, ScrapeEvent};
use crate::extract::{ExtractionConfig, ExtractionReport};
use crate::fetch::{parse_timeout, FetchRequest, FetchResult, Fetcher, HttpFetcher};
use crate::history::HistoryLog;
use crate::output::save_report;
use crate::runner::{TaskContext, TaskEvent, TaskHandle, TaskKind, TaskSlot};

/// Something the presentation layer should show.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A running task advanced.
    Progress { kind: TaskKind, percent: u8 },
    /// A page was fetched and is now the current document.
    FetchSucceeded { url: String, title: String },
    /// A fetch ended without a document.
    FetchFailed { url: String, message: String },
    /// An extraction finished.
    ExtractionSucceeded { report: ExtractionReport },
    /// An extraction failed.
    ExtractionFailed { selector: String, message: String },
    /// A non-fatal problem, such as a history write failure.
    Notice(String),
}

impl Notification {
    /// True for the notifications that end a task.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::FetchSucceeded { .. }
                | Self::FetchFailed { .. }
                | Self::ExtractionSucceeded { .. }
                | Self::ExtractionFailed { .. }
        )
    }
}

/// Returned when a task was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReceipt {
    /// Id of the new task.
    pub task_id: Uuid,
    /// Kind of the new task.
    pub kind: TaskKind,
    /// Input problems that were repaired, e.g. an invalid timeout.
    pub warnings: Vec<String>,
}

struct ActiveFetch {
    request: FetchRequest,
    handle: TaskHandle<FetchResult>,
}

struct ActiveExtraction {
    selector: String,
    handle: TaskHandle<ExtractionReport>,
}

enum Incoming {
    Fetch(TaskEvent<FetchResult>),
    Extraction(TaskEvent<ExtractionReport>),
}

/// State shared by one user's fetch/extract workflow.
pub struct Session {
    config: ScraperConfig,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn EventSink>,
    history: HistoryLog,
    fetch_slot: TaskSlot,
    extraction_slot: TaskSlot,
    fetch_task: Option<ActiveFetch>,
    extraction_task: Option<ActiveExtraction>,
    current: Option<DocumentHost>,
    output: String,
    fetch_progress: u8,
    extraction_progress: u8,
    pending: VecDeque<Notification>,
}

impl Session {
    /// Creates a session that fetches through `fetcher`.
    ///
    /// History is loaded from `config.history_path` when set.
    #[must_use]
    pub fn new(config: ScraperConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let history = config
            .history_path
            .clone()
            .map_or_else(HistoryLog::in_memory, HistoryLog::load);
        Self {
            config,
            fetcher,
            sink: Arc::new(LoggingEventSink::default()),
            history,
            fetch_slot: TaskSlot::new(TaskKind::Fetch),
            extraction_slot: TaskSlot::new(TaskKind::Extraction),
            fetch_task: None,
            extraction_task: None,
            current: None,
            output: String::new(),
            fetch_progress: 0,
            extraction_progress: 0,
            pending: VecDeque::new(),
        }
    }

    /// Creates a session backed by [`HttpFetcher`].
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_http(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Starts fetching `url`.
    ///
    /// `timeout` is user text; blank means the configured default, and an
    /// invalid value falls back to the default with a warning in the
    /// receipt. A blank `user_agent` means the default.
    ///
    /// # Errors
    ///
    /// `Validation(EmptyUrl)` for a blank URL, `Busy` while a fetch runs.
    pub fn start_fetch(
        &mut self,
        url: &str,
        timeout: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<StartReceipt, ScrapeError> {
        self.drain_ready();

        let default_timeout = self.config.fetch.effective_timeout_seconds();
        let mut warnings = Vec::new();
        let timeout_seconds = match timeout.map(str::trim).filter(|t| !t.is_empty()) {
            None => default_timeout,
            Some(text) => match parse_timeout(text, default_timeout) {
                Ok(seconds) => seconds,
                Err(err) => {
                    warn!(input = %text, "Invalid timeout, using default");
                    warnings.push(err.to_string());
                    default_timeout
                }
            },
        };

        let mut request = FetchRequest::new(url, timeout_seconds)?;
        if let Some(agent) = user_agent {
            request = request.with_user_agent(agent);
        }
        if self.fetch_task.is_some() {
            return Err(ScrapeError::Busy(TaskKind::Fetch));
        }

        let fetcher = self.fetcher.clone();
        let job = request.clone();
        let handle = self.fetch_slot.spawn(move |ctx: TaskContext<FetchResult>| {
            let observer = ctx.observer();
            async move {
                fetcher
                    .fetch(&job, observer)
                    .await
                    .map_err(ScrapeError::from)
            }
        })?;

        let task_id = handle.id();
        info!(task_id = %task_id, url = %request.url(), "Fetch started");
        self.sink.try_emit(ScrapeEvent::FetchStarted {
            task_id,
            url: request.url().to_string(),
        });
        for warning in &warnings {
            self.sink.try_emit(ScrapeEvent::Notice {
                message: warning.clone(),
            });
        }

        self.fetch_progress = 0;
        self.fetch_task = Some(ActiveFetch { request, handle });
        Ok(StartReceipt {
            task_id,
            kind: TaskKind::Fetch,
            warnings,
        })
    }

    /// Starts evaluating `selector` against the current document.
    ///
    /// The extraction stays bound to the document that is current now, even
    /// if a later fetch replaces it. `config` defaults to the session's
    /// configured facets.
    ///
    /// # Errors
    ///
    /// `Validation(NoDocument)` before the first successful fetch,
    /// `Validation(EmptySelector)` for a blank selector, `Busy` while an
    /// extraction runs.
    pub fn start_extraction(
        &mut self,
        selector: &str,
        config: Option<ExtractionConfig>,
    ) -> Result<StartReceipt, ScrapeError> {
        self.drain_ready();

        let Some(host) = self.current.clone() else {
            return Err(ValidationError::NoDocument.into());
        };
        let selector = selector.trim().to_string();
        if selector.is_empty() {
            return Err(ValidationError::EmptySelector.into());
        }
        if self.extraction_task.is_some() {
            return Err(ScrapeError::Busy(TaskKind::Extraction));
        }

        let config = config.unwrap_or(self.config.extraction);
        let document_id = host.id();
        let job = selector.clone();
        let handle = self.extraction_slot.spawn(move |ctx: TaskContext<ExtractionReport>| {
            let observer = ctx.observer();
            let token = ctx.token();
            async move { host.extract(&job, config, observer, token).await }
        })?;

        let task_id = handle.id();
        info!(task_id = %task_id, selector = %selector, document_id = %document_id, "Extraction started");
        self.sink.try_emit(ScrapeEvent::ExtractionStarted {
            task_id,
            selector: selector.clone(),
            document_id,
        });

        self.extraction_progress = 0;
        self.extraction_task = Some(ActiveExtraction { selector, handle });
        Ok(StartReceipt {
            task_id,
            kind: TaskKind::Extraction,
            warnings: Vec::new(),
        })
    }

    /// Waits for the next notification and applies it to the session.
    ///
    /// Returns `None` when nothing is queued and no task is running.
    /// Cancel-safe: dropping the future loses no events.
    pub async fn next_notification(&mut self) -> Option<Notification> {
        loop {
            if let Some(notification) = self.pending.pop_front() {
                return Some(notification);
            }

            let incoming = tokio::select! {
                Some(event) = next_fetch_event(&mut self.fetch_task) => Incoming::Fetch(event),
                Some(event) = next_extraction_event(&mut self.extraction_task) => Incoming::Extraction(event),
                else => return None,
            };
            self.apply(incoming);
        }
    }

    /// Applies events that already arrived without waiting.
    pub fn drain_ready(&mut self) {
        while let Some(event) = self
            .fetch_task
            .as_mut()
            .and_then(|task| task.handle.try_next_event())
        {
            self.apply(Incoming::Fetch(event));
        }
        while let Some(event) = self
            .extraction_task
            .as_mut()
            .and_then(|task| task.handle.try_next_event())
        {
            self.apply(Incoming::Extraction(event));
        }
    }

    /// Asks the running task of `kind` to stop. Returns false when none runs,
    /// including a task whose result already arrived.
    pub fn cancel(&mut self, kind: TaskKind, reason: &str) -> bool {
        self.drain_ready();
        let handle_id = match kind {
            TaskKind::Fetch => self
                .fetch_task
                .as_ref()
                .and_then(|task| task.handle.cancel(reason).then(|| task.handle.id())),
            TaskKind::Extraction => self
                .extraction_task
                .as_ref()
                .and_then(|task| task.handle.cancel(reason).then(|| task.handle.id())),
        };
        match handle_id {
            Some(task_id) => {
                info!(task_id = %task_id, kind = %kind, reason, "Cancellation requested");
                self.sink.try_emit(ScrapeEvent::CancelRequested {
                    task_id,
                    kind,
                    reason: reason.to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Cancels every running task.
    pub fn cancel_all(&mut self, reason: &str) {
        self.cancel(TaskKind::Fetch, reason);
        self.cancel(TaskKind::Extraction, reason);
    }

    /// True while a task of `kind` has not delivered its result.
    #[must_use]
    pub fn is_running(&self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::Fetch => self.fetch_task.is_some(),
            TaskKind::Extraction => self.extraction_task.is_some(),
        }
    }

    /// True when [`Session::next_notification`] has something to wait for.
    #[must_use]
    pub fn has_activity(&self) -> bool {
        !self.pending.is_empty() || self.fetch_task.is_some() || self.extraction_task.is_some()
    }

    /// Last reported progress of `kind`; 0 when idle.
    #[must_use]
    pub fn progress(&self, kind: TaskKind) -> u8 {
        match kind {
            TaskKind::Fetch => self.fetch_progress,
            TaskKind::Extraction => self.extraction_progress,
        }
    }

    /// The document extractions run against.
    #[must_use]
    pub fn current_document(&self) -> Option<&DocumentHost> {
        self.current.as_ref()
    }

    /// Text of the result pane.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Empties the result pane and resets progress.
    pub fn clear_output(&mut self) {
        self.output.clear();
        self.fetch_progress = 0;
        self.extraction_progress = 0;
    }

    /// Writes the result pane to `path`.
    ///
    /// # Errors
    ///
    /// `Validation(NoResults)` when the pane is empty, `Persistence` when the
    /// write fails. Neither affects the session.
    pub fn save_output(&self, path: impl AsRef<Path>) -> Result<(), ScrapeError> {
        if self.output.trim().is_empty() {
            return Err(ValidationError::NoResults.into());
        }
        let path = path.as_ref();
        save_report(path, &self.output)?;
        self.sink.try_emit(ScrapeEvent::OutputSaved {
            path: path.display().to_string(),
        });
        Ok(())
    }

    /// The visit log.
    #[must_use]
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Empties the visit log.
    ///
    /// # Errors
    ///
    /// `Persistence` when the file cannot be rewritten; the in-memory log is
    /// cleared regardless.
    pub fn clear_history(&mut self) -> Result<(), ScrapeError> {
        let result = self.history.clear();
        self.sink.try_emit(ScrapeEvent::HistoryCleared);
        result.map_err(ScrapeError::from)
    }

    /// URL to re-fetch from history: the entry at `position` in the
    /// newest-first listing, or the most recent one.
    #[must_use]
    pub fn recall_url(&self, position: Option<usize>) -> Option<String> {
        let record = match position {
            Some(position) => self.history.nth_newest(position),
            None => self.history.latest(),
        };
        record.map(|r| r.url.clone())
    }

    fn apply(&mut self, incoming: Incoming) {
        match incoming {
            Incoming::Fetch(event) => self.apply_fetch(event),
            Incoming::Extraction(event) => self.apply_extraction(event),
        }
    }

    fn apply_fetch(&mut self, event: TaskEvent<FetchResult>) {
        match event {
            TaskEvent::Progress(percent) => {
                self.fetch_progress = percent;
                self.pending.push_back(Notification::Progress {
                    kind: TaskKind::Fetch,
                    percent,
                });
            }
            terminal => {
                if let Some(task) = self.fetch_task.take() {
                    self.fetch_progress = 0;
                    self.finish_fetch(task, terminal);
                }
            }
        }
    }

    fn finish_fetch(&mut self, task: ActiveFetch, event: TaskEvent<FetchResult>) {
        let task_id = task.handle.id();
        let url = task.request.url().to_string();
        let outcome = match event {
            TaskEvent::Succeeded(page) => DocumentHost::spawn(url.clone(), page),
            TaskEvent::Failed(err) => Err(err),
            TaskEvent::Progress(_) => return,
        };

        match outcome {
            Ok(host) => {
                let title = host.title().to_string();
                self.output = format!(
                    "Website scraped successfully!\n\nPage title: {title}\n\nUse CSS selector to extract specific content."
                );
                if let Some(previous) = self.current.replace(host) {
                    debug!(document_id = %previous.id(), "Replaced current document");
                }
                self.sink.try_emit(ScrapeEvent::FetchSucceeded {
                    task_id,
                    url: url.clone(),
                    title: title.clone(),
                });
                self.pending.push_back(Notification::FetchSucceeded {
                    url: url.clone(),
                    title: title.clone(),
                });
                if let Err(err) = self.history.record_visit(url, title) {
                    self.notice(err.to_string());
                }
            }
            Err(err) => {
                let message = err.to_string();
                self.output = format!("Error scraping website: {message}");
                self.sink.try_emit(ScrapeEvent::FetchFailed {
                    task_id,
                    url: url.clone(),
                    error: message.clone(),
                });
                self.pending
                    .push_back(Notification::FetchFailed { url, message });
            }
        }
    }

    fn apply_extraction(&mut self, event: TaskEvent<ExtractionReport>) {
        match event {
            TaskEvent::Progress(percent) => {
                self.extraction_progress = percent;
                self.pending.push_back(Notification::Progress {
                    kind: TaskKind::Extraction,
                    percent,
                });
            }
            terminal => {
                if let Some(task) = self.extraction_task.take() {
                    self.extraction_progress = 0;
                    self.finish_extraction(task, terminal);
                }
            }
        }
    }

    fn finish_extraction(&mut self, task: ActiveExtraction, event: TaskEvent<ExtractionReport>) {
        let task_id = task.handle.id();
        let selector = task.selector;
        match event {
            TaskEvent::Succeeded(report) => {
                self.output = report.render();
                self.sink.try_emit(ScrapeEvent::ExtractionSucceeded {
                    task_id,
                    selector,
                    matches: report.match_count(),
                });
                self.pending
                    .push_back(Notification::ExtractionSucceeded { report });
            }
            TaskEvent::Failed(err) => {
                let message = err.to_string();
                self.output = format!("Error extracting content: {message}");
                self.sink.try_emit(ScrapeEvent::ExtractionFailed {
                    task_id,
                    selector: selector.clone(),
                    error: message.clone(),
                });
                self.pending
                    .push_back(Notification::ExtractionFailed { selector, message });
            }
            TaskEvent::Progress(_) => {}
        }
    }

    fn notice(&mut self, message: String) {
        warn!(message = %message, "Notice");
        self.sink.try_emit(ScrapeEvent::Notice {
            message: message.clone(),
        });
        self.pending.push_back(Notification::Notice(message));
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current", &self.current)
            .field("fetch_running", &self.fetch_task.is_some())
            .field("extraction_running", &self.extraction_task.is_some())
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}

async fn next_fetch_event(task: &mut Option<ActiveFetch>) -> Option<TaskEvent<FetchResult>> {
    match task {
        Some(task) => task.handle.next_event().await,
        None => None,
    }
}

async fn next_extraction_event(
    task: &mut Option<ActiveExtraction>,
) -> Option<TaskEvent<ExtractionReport>> {
    match task {
        Some(task) => task.handle.next_event().await,
        None => None,
    }
}

//! A dedicated thread that owns one parsed document.
//!
//! `scraper::Html` cannot cross threads, so each fetched page is parsed on
//! its own host thread and extraction jobs are sent to it. Dropping every
//! [`DocumentHost`] clone closes the job queue and ends the thread once the
//! queued jobs are served.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::model::DocumentModel;
use super::selector::CompiledSelector;
use crate::cancellation::CancellationToken;
use crate::errors::ScrapeError;
use crate::extract::{extract, ExtractionConfig, ExtractionReport};
use crate::fetch::FetchResult;
use crate::runner::ProgressObserver;

struct ExtractionJob {
    selector: String,
    config: ExtractionConfig,
    progress: Arc<dyn ProgressObserver>,
    token: Arc<CancellationToken>,
    reply: oneshot::Sender<Result<ExtractionReport, ScrapeError>>,
}

/// Handle to the thread hosting one fetched document.
#[derive(Clone)]
pub struct DocumentHost {
    id: Uuid,
    url: String,
    title: String,
    jobs: mpsc::UnboundedSender<ExtractionJob>,
}

impl DocumentHost {
    /// Starts a host thread and parses `page` on it.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Internal`] when the OS refuses to start the thread.
    pub fn spawn(url: impl Into<String>, page: FetchResult) -> Result<Self, ScrapeError> {
        let id = Uuid::new_v4();
        let url = url.into();
        let title = page.title.clone();
        let (jobs, mut queue) = mpsc::unbounded_channel::<ExtractionJob>();

        let thread_url = url.clone();
        std::thread::Builder::new()
            .name(format!("pagescope-doc-{}", &id.simple().to_string()[..8]))
            .spawn(move || {
                let model = DocumentModel::parse(&page.raw_html);
                drop(page);
                debug!(document_id = %id, url = %thread_url, "Document parsed");

                while let Some(job) = queue.blocking_recv() {
                    serve(&model, job);
                }
                debug!(document_id = %id, "Document host stopped");
            })
            .map_err(|e| ScrapeError::Internal(format!("failed to start document host: {e}")))?;

        info!(document_id = %id, url = %url, title = %title, "Document host started");
        Ok(Self {
            id,
            url,
            title,
            jobs,
        })
    }

    /// Host id, unique per fetched page.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// URL the document was fetched from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Page title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Evaluates `selector` against this document and builds a report.
    ///
    /// Progress milestones: 20 on start, 50 after matching, 100 with the
    /// report.
    ///
    /// # Errors
    ///
    /// `Selector` for invalid syntax, `Cancelled` if `token` fired before
    /// the job was picked up, `Internal` if the host thread is gone.
    pub async fn extract(
        &self,
        selector: &str,
        config: ExtractionConfig,
        progress: Arc<dyn ProgressObserver>,
        token: Arc<CancellationToken>,
    ) -> Result<ExtractionReport, ScrapeError> {
        let (reply, response) = oneshot::channel();
        let job = ExtractionJob {
            selector: selector.to_string(),
            config,
            progress,
            token,
            reply,
        };
        self.jobs
            .send(job)
            .map_err(|_| ScrapeError::Internal("document host is not running".to_string()))?;
        response
            .await
            .map_err(|_| ScrapeError::Internal("document host dropped the job".to_string()))?
    }
}

impl std::fmt::Debug for DocumentHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentHost")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

fn serve(model: &DocumentModel, job: ExtractionJob) {
    let ExtractionJob {
        selector,
        config,
        progress,
        token,
        reply,
    } = job;

    if token.is_cancelled() {
        let reason = token.reason().unwrap_or_else(|| "cancelled".to_string());
        let _ = reply.send(Err(ScrapeError::Cancelled(reason)));
        return;
    }

    let outcome = catch_unwind(AssertUnwindSafe(|| -> Result<ExtractionReport, ScrapeError> {
        progress.on_progress(20);
        let compiled = CompiledSelector::parse(&selector)?;
        let elements = model.select_compiled(&compiled);
        progress.on_progress(50);
        let report = extract(compiled.source(), &elements, &config);
        progress.on_progress(100);
        Ok(report)
    }))
    .unwrap_or_else(|_| {
        error!(selector = %selector, "Extraction panicked");
        Err(ScrapeError::Internal("extraction panicked".to_string()))
    });

    if reply.send(outcome).is_err() {
        debug!(selector = %selector, "Extraction result discarded, requester gone");
    }
}

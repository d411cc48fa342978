//! # Pagescope
//!
//! Fetch a web page once, then query it repeatedly with CSS selectors.
//!
//! Pagescope provides:
//!
//! - **Fetching**: one HTTP GET per page with timeout, user agent and redirects
//! - **Selector evaluation**: a parsed document queried with CSS selectors
//! - **Reports**: per-element text, links, images and markup in a fixed layout
//! - **Background tasks**: progress, single-flight per kind, cancellation
//! - **History**: a persisted log of fetched pages
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagescope::prelude::*;
//!
//! # async fn run() -> Result<(), ScrapeError> {
//! let mut session = Session::with_http(ScraperConfig::default())?;
//! session.start_fetch("example.com", None, None)?;
//! while let Some(notification) = session.next_notification().await {
//!     if notification.is_terminal() {
//!         break;
//!     }
//! }
//!
//! session.start_extraction("a", None)?;
//! while let Some(notification) = session.next_notification().await {
//!     if let Notification::ExtractionSucceeded { report } = notification {
//!         println!("{report}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod document;
pub mod errors;
pub mod events;
pub mod extract;
pub mod fetch;
pub mod history;
pub mod observability;
pub mod output;
pub mod runner;
pub mod session;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{FetchDefaults, ScraperConfig};
    pub use crate::document::{DocumentHost, DocumentModel, ElementHandle};
    pub use crate::errors::{
        FetchError, PersistenceError, ScrapeError, SelectorError, ValidationError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink, ScrapeEvent};
    pub use crate::extract::{extract, ExtractionConfig, ExtractionReport, Facet};
    pub use crate::fetch::{FetchRequest, FetchResult, Fetcher, HttpFetcher};
    pub use crate::history::{HistoryLog, HistoryRecord};
    pub use crate::runner::{ProgressObserver, TaskEvent, TaskHandle, TaskKind, TaskSlot};
    pub use crate::session::{Notification, Session, StartReceipt};
}

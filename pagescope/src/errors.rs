//! Error types for pagescope.
//!
//! Every component has its own small error enum. [`ScrapeError`] aggregates
//! them for the session and task runner, which surface failures to the
//! presentation layer as plain descriptions.

use std::path::PathBuf;
use thiserror::Error;

use crate::runner::TaskKind;

/// The main error type for pagescope operations.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Input was rejected before any background work started.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The HTTP fetch failed.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// The selector could not be parsed.
    #[error("{0}")]
    Selector(#[from] SelectorError),

    /// Reading or writing a file failed.
    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    /// An operation of the same kind is already running.
    #[error("Busy: {0} already in progress")]
    Busy(TaskKind),

    /// The operation was cancelled before it finished.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// A background worker went away without reporting a result.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a single HTTP fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, DNS or body read failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a status outside 200-299.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// The request did not complete within the timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

impl FetchError {
    /// Returns the HTTP status code, if this is a status error.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Failure to compile a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector syntax could not be parsed.
    #[error("Invalid selector '{selector}': {reason}")]
    Invalid {
        /// The selector as given.
        selector: String,
        /// Parser message.
        reason: String,
    },
}

impl SelectorError {
    /// Creates an invalid-selector error.
    #[must_use]
    pub fn invalid(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}

/// Failure reading or writing durable state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A file could not be read or decoded.
    #[error("Error reading {path}: {reason}")]
    ReadFailed {
        /// File involved.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },

    /// A file could not be written.
    #[error("Error saving {path}: {reason}")]
    WriteFailed {
        /// File involved.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },
}

impl PersistenceError {
    /// Creates a read failure.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ReadFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a write failure.
    #[must_use]
    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::WriteFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Input rejected (or repaired) before starting background work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No URL was entered.
    #[error("Please enter a URL")]
    EmptyUrl,

    /// The timeout was not a positive whole number of seconds.
    #[error("Invalid timeout value '{input}', using default of {fallback} seconds")]
    InvalidTimeoutValue {
        /// What the user typed.
        input: String,
        /// The timeout used instead.
        fallback: u64,
    },

    /// No selector was entered.
    #[error("Please enter a CSS selector")]
    EmptySelector,

    /// Extraction was requested before any page was fetched.
    #[error("Please scrape a website first")]
    NoDocument,

    /// Saving was requested with an empty result pane.
    #[error("No results to save")]
    NoResults,

    /// An extraction facet name was not recognized.
    #[error("Unknown facet '{0}'")]
    UnknownFacet(String),
}

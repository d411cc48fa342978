//! Configuration types for fetching, extraction and history.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::PersistenceError;
use crate::extract::ExtractionConfig;

/// User agent sent when the caller does not supply one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Defaults applied to every fetch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchDefaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for FetchDefaults {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchDefaults {
    /// Timeout in seconds, falling back to 30 when configured as zero.
    #[must_use]
    pub fn effective_timeout_seconds(&self) -> u64 {
        if self.timeout_seconds == 0 {
            default_timeout()
        } else {
            self.timeout_seconds
        }
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.effective_timeout_seconds())
    }
}

/// Top-level configuration for a scraping session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Fetch defaults.
    #[serde(default)]
    pub fetch: FetchDefaults,
    /// Facets enabled when the caller does not choose.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Where the history log is persisted. `None` keeps history in memory.
    #[serde(default = "default_history_path")]
    pub history_path: Option<PathBuf>,
}

fn default_history_path() -> Option<PathBuf> {
    Some(PathBuf::from("scraper_history.json"))
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            fetch: FetchDefaults::default(),
            extraction: ExtractionConfig::default(),
            history_path: default_history_path(),
        }
    }
}

impl ScraperConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a JSON file. Missing keys take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| PersistenceError::read(path, e))?;
        serde_json::from_str(&raw).map_err(|e| PersistenceError::read(path, e))
    }

    /// Sets the default timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.fetch.timeout_seconds = seconds;
        self
    }

    /// Sets the default user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.fetch.user_agent = user_agent.into();
        self
    }

    /// Sets the history file location.
    #[must_use]
    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = Some(path.into());
        self
    }

    /// Keeps history in memory only.
    #[must_use]
    pub fn without_history_file(mut self) -> Self {
        self.history_path = None;
        self
    }

    /// Sets the default extraction facets.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::default();
        assert_eq!(config.fetch.timeout_seconds, 30);
        assert_eq!(config.fetch.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.history_path, Some(PathBuf::from("scraper_history.json")));
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_zero_timeout_uses_builtin_default() {
        let config: ScraperConfig =
            serde_json::from_str(r#"{"fetch": {"timeout_seconds": 0}}"#).unwrap();
        assert_eq!(config.fetch.effective_timeout_seconds(), 30);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(ScraperConfig::new().with_timeout(9).fetch.effective_timeout_seconds(), 9);
    }

    #[test]
    fn test_builders() {
        let config = ScraperConfig::new()
            .with_timeout(5)
            .with_user_agent("probe/1.0")
            .without_history_file();
        assert_eq!(config.fetch.timeout_seconds, 5);
        assert_eq!(config.fetch.user_agent, "probe/1.0");
        assert!(config.history_path.is_none());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: ScraperConfig =
            serde_json::from_str(r#"{"fetch": {"timeout_seconds": 12}}"#).unwrap();
        assert_eq!(config.fetch.timeout_seconds, 12);
        assert_eq!(config.fetch.user_agent, DEFAULT_USER_AGENT);
        assert!(config.extraction.include_text);
        assert!(!config.extraction.include_images);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"history_path": null, "extraction": {{"include_html": true}}}}"#).unwrap();

        let config = ScraperConfig::from_file(file.path()).unwrap();
        assert!(config.history_path.is_none());
        assert!(config.extraction.include_html);
        assert!(config.extraction.include_links);
    }

    #[test]
    fn test_from_missing_file() {
        let err = ScraperConfig::from_file("/nonexistent/pagescope.json").unwrap_err();
        assert!(matches!(err, PersistenceError::ReadFailed { .. }));
    }
}

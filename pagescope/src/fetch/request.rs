//! Fetch requests and input normalization.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::FetchDefaults;
use crate::errors::ValidationError;

/// One HTTP GET to perform. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    url: String,
    timeout_seconds: u64,
    user_agent: Option<String>,
}

impl FetchRequest {
    /// Creates a request, normalizing the URL.
    ///
    /// # Errors
    ///
    /// `EmptyUrl` for a blank URL, `InvalidTimeoutValue` for a zero timeout.
    pub fn new(url: &str, timeout_seconds: u64) -> Result<Self, ValidationError> {
        let url = normalize_url(url)?;
        if timeout_seconds == 0 {
            return Err(ValidationError::InvalidTimeoutValue {
                input: "0".to_string(),
                fallback: FetchDefaults::default().timeout_seconds,
            });
        }
        Ok(Self {
            url,
            timeout_seconds,
            user_agent: None,
        })
    }

    /// Sets a custom user agent. Blank values keep the default.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        let trimmed = user_agent.trim();
        self.user_agent = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// The normalized URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Timeout in whole seconds.
    #[must_use]
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// The caller-supplied user agent, if any.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// The user agent to send: the custom one or `default`.
    #[must_use]
    pub fn effective_user_agent<'a>(&'a self, default: &'a str) -> &'a str {
        self.user_agent.as_deref().unwrap_or(default)
    }
}

/// Trims the URL and prepends `https://` when no HTTP scheme is present.
pub fn normalize_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{trimmed}"))
    }
}

/// Parses a user-typed timeout.
///
/// # Errors
///
/// `InvalidTimeoutValue` carrying `fallback` when the text is not a positive
/// whole number. Callers recover by using the fallback.
pub fn parse_timeout(input: &str, fallback: u64) -> Result<u64, ValidationError> {
    match input.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(ValidationError::InvalidTimeoutValue {
            input: input.to_string(),
            fallback,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_scheme() {
        assert_eq!(normalize_url("example.com").unwrap(), "https://example.com");
        assert_eq!(normalize_url("  example.com/a  ").unwrap(), "https://example.com/a");
    }

    #[test]
    fn test_normalize_keeps_http_schemes() {
        assert_eq!(normalize_url("http://example.com").unwrap(), "http://example.com");
        assert_eq!(normalize_url("https://example.com").unwrap(), "https://example.com");
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert_eq!(normalize_url(""), Err(ValidationError::EmptyUrl));
        assert_eq!(normalize_url("   "), Err(ValidationError::EmptyUrl));
    }

    #[test]
    fn test_request_rejects_zero_timeout() {
        assert!(matches!(
            FetchRequest::new("example.com", 0),
            Err(ValidationError::InvalidTimeoutValue { .. })
        ));
    }

    #[test]
    fn test_user_agent() {
        let request = FetchRequest::new("example.com", 10).unwrap();
        assert_eq!(request.user_agent(), None);
        assert_eq!(request.effective_user_agent("default/1.0"), "default/1.0");

        let request = request.with_user_agent("custom/2.0");
        assert_eq!(request.effective_user_agent("default/1.0"), "custom/2.0");

        let request = request.with_user_agent("   ");
        assert_eq!(request.user_agent(), None);
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("15", 30), Ok(15));
        assert_eq!(parse_timeout(" 5 ", 30), Ok(5));
        assert_eq!(
            parse_timeout("abc", 30),
            Err(ValidationError::InvalidTimeoutValue {
                input: "abc".to_string(),
                fallback: 30
            })
        );
        assert!(parse_timeout("0", 30).is_err());
        assert!(parse_timeout("-4", 30).is_err());
    }
}

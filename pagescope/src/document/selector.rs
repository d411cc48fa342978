//! CSS selector compilation.

use scraper::Selector;

use crate::errors::SelectorError;

/// A parsed CSS selector together with its source text.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    source: String,
    inner: Selector,
}

impl CompiledSelector {
    /// Compiles `source`.
    ///
    /// # Errors
    ///
    /// [`SelectorError::Invalid`] for blank or syntactically invalid input.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::invalid(source, "selector is empty"));
        }
        let inner = Selector::parse(trimmed)
            .map_err(|e| SelectorError::invalid(trimmed, e.to_string()))?;
        Ok(Self {
            source: trimmed.to_string(),
            inner,
        })
    }

    /// The selector text as compiled.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn as_scraper(&self) -> &Selector {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_forms() {
        for source in [
            "div",
            ".x",
            "#main",
            "a[href]",
            "ul > li",
            "div p",
            "li:first-child",
            "tr:nth-child(2n+1)",
            "h1, h2",
        ] {
            assert!(CompiledSelector::parse(source).is_ok(), "{source}");
        }
    }

    #[test]
    fn test_rejects_invalid_syntax() {
        let err = CompiledSelector::parse("div[").unwrap_err();
        let SelectorError::Invalid { selector, reason } = err;
        assert_eq!(selector, "div[");
        assert!(!reason.is_empty());
    }

    #[test]
    fn test_rejects_blank() {
        assert!(CompiledSelector::parse("").is_err());
        assert!(CompiledSelector::parse("   ").is_err());
    }

    #[test]
    fn test_source_is_trimmed() {
        let compiled = CompiledSelector::parse("  .item ").unwrap();
        assert_eq!(compiled.source(), ".item");
    }
}

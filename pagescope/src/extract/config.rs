//! Extraction facet selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// One kind of information pulled from each matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    /// Stripped text content.
    Text,
    /// The element's own href, or its descendant links.
    Links,
    /// Descendant images.
    Images,
    /// Outer markup.
    Html,
}

impl Facet {
    /// All facets in rendering order.
    pub const ALL: [Self; 4] = [Self::Text, Self::Links, Self::Images, Self::Html];

    /// Facet name as typed by users.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Links => "links",
            Self::Images => "images",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "links" | "link" => Ok(Self::Links),
            "images" | "image" => Ok(Self::Images),
            "html" | "markup" => Ok(Self::Html),
            other => Err(ValidationError::UnknownFacet(other.to_string())),
        }
    }
}

/// Which facets an extraction renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExtractionConfig {
    /// Render stripped text.
    pub include_text: bool,
    /// Render links.
    pub include_links: bool,
    /// Render images.
    pub include_images: bool,
    /// Render outer markup.
    pub include_html: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            include_text: true,
            include_links: true,
            include_images: false,
            include_html: false,
        }
    }
}

impl ExtractionConfig {
    /// A config with exactly the given facets enabled.
    #[must_use]
    pub fn only(facets: &[Facet]) -> Self {
        Self {
            include_text: false,
            include_links: false,
            include_images: false,
            include_html: false,
        }
        .with_facets(facets, true)
    }

    /// Enables or disables each of `facets`.
    #[must_use]
    pub fn with_facets(mut self, facets: &[Facet], enabled: bool) -> Self {
        for facet in facets {
            match facet {
                Facet::Text => self.include_text = enabled,
                Facet::Links => self.include_links = enabled,
                Facet::Images => self.include_images = enabled,
                Facet::Html => self.include_html = enabled,
            }
        }
        self
    }

    /// Toggles [`Facet::Text`].
    #[must_use]
    pub fn with_text(self, enabled: bool) -> Self {
        self.with_facets(&[Facet::Text], enabled)
    }

    /// Toggles [`Facet::Links`].
    #[must_use]
    pub fn with_links(self, enabled: bool) -> Self {
        self.with_facets(&[Facet::Links], enabled)
    }

    /// Toggles [`Facet::Images`].
    #[must_use]
    pub fn with_images(self, enabled: bool) -> Self {
        self.with_facets(&[Facet::Images], enabled)
    }

    /// Toggles [`Facet::Html`].
    #[must_use]
    pub fn with_html(self, enabled: bool) -> Self {
        self.with_facets(&[Facet::Html], enabled)
    }

    /// Whether `facet` is enabled.
    #[must_use]
    pub fn includes(&self, facet: Facet) -> bool {
        match facet {
            Facet::Text => self.include_text,
            Facet::Links => self.include_links,
            Facet::Images => self.include_images,
            Facet::Html => self.include_html,
        }
    }

    /// Enabled facets in rendering order.
    #[must_use]
    pub fn facets(&self) -> Vec<Facet> {
        Facet::ALL.into_iter().filter(|f| self.includes(*f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_facets() {
        assert_eq!(ExtractionConfig::default().facets(), vec![Facet::Text, Facet::Links]);
    }

    #[test]
    fn test_only() {
        let config = ExtractionConfig::only(&[Facet::Images, Facet::Html]);
        assert!(!config.include_text);
        assert!(!config.include_links);
        assert!(config.include_images);
        assert!(config.include_html);
    }

    #[test]
    fn test_toggles() {
        let config = ExtractionConfig::default().with_text(false).with_images(true);
        assert_eq!(config.facets(), vec![Facet::Links, Facet::Images]);
    }

    #[test]
    fn test_facet_parsing() {
        assert_eq!("Text".parse::<Facet>().unwrap(), Facet::Text);
        assert_eq!(" image ".parse::<Facet>().unwrap(), Facet::Images);
        assert_eq!("markup".parse::<Facet>().unwrap(), Facet::Html);
        assert_eq!(
            "colour".parse::<Facet>(),
            Err(ValidationError::UnknownFacet("colour".to_string()))
        );
    }
}

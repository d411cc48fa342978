//! Extraction reports and their text rendering.

use serde::Serialize;
use std::fmt;

/// Most descendant links listed per element.
pub const MAX_LINKS: usize = 5;
/// Most descendant images listed per element.
pub const MAX_IMAGES: usize = 3;
/// Markup longer than this many characters is truncated.
pub const MAX_MARKUP_CHARS: usize = 500;

/// Placeholder for an anchor without `href`.
pub const NO_LINK: &str = "No link";
/// Placeholder for an image without `src`.
pub const NO_SOURCE: &str = "No source";
/// Placeholder for an image without `alt`.
pub const NO_ALT: &str = "No alt text";

/// A capped list: the first entries plus a count of the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing<T> {
    /// Entries rendered in full.
    pub shown: Vec<T>,
    /// Entries left out.
    pub remaining: usize,
}

impl<T> Listing<T> {
    /// Keeps the first `limit` items of `items`.
    pub fn capped(items: impl IntoIterator<Item = T>, limit: usize) -> Self {
        let mut shown = Vec::new();
        let mut remaining = 0;
        for item in items {
            if shown.len() < limit {
                shown.push(item);
            } else {
                remaining += 1;
            }
        }
        Self { shown, remaining }
    }

    /// True when nothing was found at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.remaining == 0
    }

    /// Number of items found, shown or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.shown.len() + self.remaining
    }
}

/// One image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    /// `src` attribute or [`NO_SOURCE`].
    pub src: String,
    /// `alt` attribute or [`NO_ALT`].
    pub alt: String,
}

/// One facet rendered for one element.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "facet", rename_all = "snake_case")]
pub enum FacetBlock {
    /// Stripped text.
    Text { text: String },
    /// An anchor's own href.
    Link { href: String },
    /// Hrefs of descendant anchors.
    LinkList { links: Listing<String> },
    /// Descendant images.
    Images { images: Listing<ImageEntry> },
    /// Outer markup, possibly cut at [`MAX_MARKUP_CHARS`].
    Markup { html: String, truncated: bool },
}

impl fmt::Display for FacetBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { text } => writeln!(f, "Text: {text}"),
            Self::Link { href } => writeln!(f, "Link: {href}"),
            Self::LinkList { links } => {
                if links.is_empty() {
                    return writeln!(f, "Links found: none");
                }
                writeln!(f, "Links found:")?;
                for (i, href) in links.shown.iter().enumerate() {
                    writeln!(f, "  {}. {href}", i + 1)?;
                }
                if links.remaining > 0 {
                    writeln!(f, "  ... and {} more links", links.remaining)?;
                }
                Ok(())
            }
            Self::Images { images } => {
                if images.is_empty() {
                    return writeln!(f, "Images found: none");
                }
                writeln!(f, "Images found:")?;
                for (i, image) in images.shown.iter().enumerate() {
                    writeln!(f, "  {}. {} - Alt: {}", i + 1, image.src, image.alt)?;
                }
                if images.remaining > 0 {
                    writeln!(f, "  ... and {} more images", images.remaining)?;
                }
                Ok(())
            }
            Self::Markup { html, truncated } => {
                let ellipsis = if *truncated { "..." } else { "" };
                writeln!(f, "HTML: {html}{ellipsis}")
            }
        }
    }
}

/// Facet blocks for one matched element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSection {
    /// Position among the matches, starting at 1.
    pub index: usize,
    /// Blocks in facet order.
    pub blocks: Vec<FacetBlock>,
}

impl fmt::Display for ElementSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Element {} ---", self.index)?;
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        writeln!(f)
    }
}

/// Everything extracted by one selector evaluation.
///
/// Rendering is deterministic: the same report always produces the same
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    selector: String,
    sections: Vec<ElementSection>,
}

impl ExtractionReport {
    /// Creates a report from sections already in match order.
    #[must_use]
    pub fn new(selector: impl Into<String>, sections: Vec<ElementSection>) -> Self {
        Self {
            selector: selector.into(),
            sections,
        }
    }

    /// The selector that produced this report.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Per-element sections.
    #[must_use]
    pub fn sections(&self) -> &[ElementSection] {
        &self.sections
    }

    /// Number of matched elements.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.sections.len()
    }

    /// True when the selector matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Renders the report as display text.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExtractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sections.is_empty() {
            return write!(f, "No elements found matching selector: {}", self.selector);
        }
        write!(
            f,
            "Found {} elements matching '{}':\n\n",
            self.sections.len(),
            self.selector
        )?;
        for section in &self.sections {
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

//! Parsed HTML documents and element handles.

use scraper::{ElementRef, Html, Selector};

use super::selector::CompiledSelector;
use crate::errors::SelectorError;
use crate::fetch::NO_TITLE;

/// One parsed HTML document.
///
/// Parsing never fails: malformed markup is repaired the way browsers do.
/// The tree is read-only after construction.
pub struct DocumentModel {
    html: Html,
}

impl DocumentModel {
    /// Parses `raw` as a full HTML document.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self {
            html: Html::parse_document(raw),
        }
    }

    /// Evaluates a selector, returning matches in document order.
    ///
    /// # Errors
    ///
    /// [`SelectorError::Invalid`] when `selector` does not parse.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementHandle<'_>>, SelectorError> {
        let compiled = CompiledSelector::parse(selector)?;
        Ok(self.select_compiled(&compiled))
    }

    /// Evaluates an already compiled selector.
    #[must_use]
    pub fn select_compiled(&self, selector: &CompiledSelector) -> Vec<ElementHandle<'_>> {
        self.html
            .select(selector.as_scraper())
            .map(ElementHandle::new)
            .collect()
    }

    /// Text of the first `<title>`, or `No title` when missing or blank.
    #[must_use]
    pub fn title(&self) -> String {
        Selector::parse("title")
            .ok()
            .and_then(|selector| {
                self.html
                    .select(&selector)
                    .next()
                    .map(|el| el.text().collect::<String>().trim().to_string())
            })
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string())
    }
}

impl std::fmt::Debug for DocumentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentModel")
            .field("title", &self.title())
            .finish_non_exhaustive()
    }
}

/// Scans raw markup for its page title.
#[must_use]
pub fn extract_title(raw: &str) -> String {
    DocumentModel::parse(raw).title()
}

/// A borrowed element inside a [`DocumentModel`].
#[derive(Debug, Clone, Copy)]
pub struct ElementHandle<'doc> {
    element: ElementRef<'doc>,
}

impl<'doc> ElementHandle<'doc> {
    fn new(element: ElementRef<'doc>) -> Self {
        Self { element }
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn tag_name(&self) -> &'doc str {
        self.element.value().name()
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'doc str> {
        self.element.value().attr(name)
    }

    /// All attributes as name/value pairs.
    #[must_use]
    pub fn attrs(&self) -> Vec<(&'doc str, &'doc str)> {
        self.element.value().attrs().collect()
    }

    /// Whether this element is an `<a>`.
    #[must_use]
    pub fn is_anchor(&self) -> bool {
        self.tag_name() == "a"
    }

    /// Every descendant text node trimmed, blanks dropped, joined with no
    /// separator.
    #[must_use]
    pub fn stripped_text(&self) -> String {
        self.element
            .text()
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }

    /// Descendant `<a>` elements, excluding this element.
    #[must_use]
    pub fn links(&self) -> Vec<ElementHandle<'doc>> {
        self.descendants_named("a")
    }

    /// Descendant `<img>` elements, excluding this element.
    #[must_use]
    pub fn images(&self) -> Vec<ElementHandle<'doc>> {
        self.descendants_named("img")
    }

    /// Serialized markup of this element and its subtree.
    #[must_use]
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    fn descendants_named(&self, name: &str) -> Vec<ElementHandle<'doc>> {
        self.element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == name)
            .map(ElementHandle::new)
            .collect()
    }
}

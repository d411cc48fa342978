//! Turns matched elements into an [`ExtractionReport`].

use super::config::ExtractionConfig;
use super::report::{
    ElementSection, ExtractionReport, FacetBlock, ImageEntry, Listing, MAX_IMAGES, MAX_LINKS,
    MAX_MARKUP_CHARS, NO_ALT, NO_LINK, NO_SOURCE,
};
use crate::document::ElementHandle;

/// Builds a report for `elements`, matched by `selector`.
///
/// Pure: the document is only read, and the same input always gives the
/// same report.
#[must_use]
pub fn extract(
    selector: &str,
    elements: &[ElementHandle<'_>],
    config: &ExtractionConfig,
) -> ExtractionReport {
    let sections = elements
        .iter()
        .enumerate()
        .map(|(i, element)| ElementSection {
            index: i + 1,
            blocks: facet_blocks(element, config),
        })
        .collect();
    ExtractionReport::new(selector, sections)
}

fn facet_blocks(element: &ElementHandle<'_>, config: &ExtractionConfig) -> Vec<FacetBlock> {
    let mut blocks = Vec::new();

    if config.include_text {
        blocks.push(FacetBlock::Text {
            text: element.stripped_text(),
        });
    }

    if config.include_links {
        if element.is_anchor() {
            blocks.push(FacetBlock::Link {
                href: element.attr("href").unwrap_or(NO_LINK).to_string(),
            });
        } else {
            let hrefs = element
                .links()
                .into_iter()
                .map(|a| a.attr("href").unwrap_or(NO_LINK).to_string());
            blocks.push(FacetBlock::LinkList {
                links: Listing::capped(hrefs, MAX_LINKS),
            });
        }
    }

    if config.include_images {
        let images = element.images().into_iter().map(|img| ImageEntry {
            src: img.attr("src").unwrap_or(NO_SOURCE).to_string(),
            alt: img.attr("alt").unwrap_or(NO_ALT).to_string(),
        });
        blocks.push(FacetBlock::Images {
            images: Listing::capped(images, MAX_IMAGES),
        });
    }

    if config.include_html {
        blocks.push(markup_block(element.outer_html()));
    }

    blocks
}

fn markup_block(html: String) -> FacetBlock {
    match html.char_indices().nth(MAX_MARKUP_CHARS) {
        Some((cut, _)) => FacetBlock::Markup {
            html: html[..cut].to_string(),
            truncated: true,
        },
        None => FacetBlock::Markup {
            html,
            truncated: false,
        },
    }
}

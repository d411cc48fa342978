//! Report generation from selector matches.

mod config;
mod extractor;
mod report;

pub use config::{ExtractionConfig, Facet};
pub use extractor::extract;
pub use report::{
    ElementSection, ExtractionReport, FacetBlock, ImageEntry, Listing, MAX_IMAGES, MAX_LINKS,
    MAX_MARKUP_CHARS, NO_ALT, NO_LINK, NO_SOURCE,
};

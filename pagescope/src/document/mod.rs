//! Parsed documents and selector evaluation.

mod host;
mod model;
mod selector;

pub use host::DocumentHost;
pub use model::{extract_title, DocumentModel, ElementHandle};
pub use selector::CompiledSelector;

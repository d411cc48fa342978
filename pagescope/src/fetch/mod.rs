//! Page retrieval.
//!
//! [`Fetcher`] is the seam; [`HttpFetcher`] is the production
//! implementation. A fetch performs exactly one GET, follows redirects and
//! never retries.

mod http;
mod protocols;
mod request;

pub use http::HttpFetcher;
pub use protocols::{FetchResult, Fetcher, NO_TITLE};
pub use request::{normalize_url, parse_timeout, FetchRequest};

#[cfg(test)]
pub use protocols::MockFetcher;

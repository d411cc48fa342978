//! reqwest-backed fetcher.

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{redirect, Client};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::protocols::{FetchResult, Fetcher};
use super::request::FetchRequest;
use crate::config::FetchDefaults;
use crate::document::extract_title;
use crate::errors::FetchError;
use crate::runner::ProgressObserver;

const MAX_REDIRECTS: usize = 10;

/// Fetches pages over HTTP(S) with a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    default_user_agent: String,
}

impl HttpFetcher {
    /// Creates a fetcher using `defaults` for requests that leave the user
    /// agent unset.
    pub fn new(defaults: &FetchDefaults) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            default_user_agent: defaults.user_agent.clone(),
        })
    }

    fn classify(err: &reqwest::Error, request: &FetchRequest) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(request.timeout_seconds())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: Arc<dyn ProgressObserver>,
    ) -> Result<FetchResult, FetchError> {
        let user_agent = request.effective_user_agent(&self.default_user_agent);
        let builder = self
            .client
            .get(request.url())
            .header(USER_AGENT, user_agent)
            .timeout(request.timeout());
        progress.on_progress(10);

        debug!(url = %request.url(), timeout_s = request.timeout_seconds(), "Sending request");
        progress.on_progress(30);
        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url(), error = %e, "Request failed");
            Self::classify(&e, request)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %request.url(), status = status.as_u16(), "Non-success status");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        let final_url = response.url().to_string();

        let raw_html = response
            .text()
            .await
            .map_err(|e| Self::classify(&e, request))?;
        progress.on_progress(70);

        let title = extract_title(&raw_html);
        progress.on_progress(100);

        info!(
            url = %request.url(),
            final_url = %final_url,
            bytes = raw_html.len(),
            "Fetched page"
        );

        Ok(FetchResult {
            raw_html,
            title,
            final_url,
            status_code: status.as_u16(),
        })
    }
}

//! Dataset transport.
//!
//! The store never talks to the network itself. It asks a
//! [`DatasetFetcher`] for the document and maps whatever comes back onto
//! its state machine. [`HttpDatasetFetcher`] is the production
//! implementation: one `GET`, no retries, timeout enforced by the client.

use async_trait::async_trait;
use ride_map_layer_models::{AnalysisDataset, DatasetError};
use thiserror::Error;

use crate::config::DashboardConfig;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Failure of the one dataset request.
///
/// Every variant ends up as a single human-readable message in the store;
/// the variants exist for logging and for callers that want to tell them
/// apart.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response body is not a valid analysis dataset.
    #[error("Invalid analysis data: {0}")]
    Decode(#[from] DatasetError),

    /// Transport-level failure described only by a message (e.g. a
    /// timeout).
    #[error("{message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },
}

impl FetchError {
    /// Creates a [`FetchError::Transport`] with `message`.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Source of the consolidated analysis dataset.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Fetches and decodes the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails, times out, or the
    /// document cannot be decoded.
    async fn fetch(&self) -> Result<AnalysisDataset, FetchError>;
}

/// Fetches the dataset over HTTP(S) with a single `GET`.
pub struct HttpDatasetFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpDatasetFetcher {
    /// Builds a fetcher from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &DashboardConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            url: config.data_url.clone(),
        })
    }

    /// URL this fetcher requests.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DatasetFetcher for HttpDatasetFetcher {
    async fn fetch(&self) -> Result<AnalysisDataset, FetchError> {
        log::info!("Fetching analysis data from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Analysis data request failed: HTTP {status} from {}", self.url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let text = response.text().await.map_err(map_transport_error)?;

        AnalysisDataset::from_json_str(&text).map_err(|e| {
            log::error!(
                "Analysis data decode failed.\n  \
                 url: {}\n  \
                 content-type: {content_type:?}\n  \
                 received: {} bytes\n  \
                 error: {e}\n  \
                 body preview: {}",
                self.url,
                text.len(),
                preview(&text),
            );
            FetchError::Decode(e)
        })
    }
}

/// Timeouts surface as a plain "network timeout" message; everything else
/// keeps the `reqwest` error.
fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        log::warn!("Analysis data request timed out: {e}");
        FetchError::transport("network timeout")
    } else {
        log::warn!("Analysis data request failed: {e}");
        FetchError::Http(e)
    }
}

fn preview(text: &str) -> &str {
    text.char_indices()
        .nth(BODY_PREVIEW_LEN)
        .map_or(text, |(idx, _)| &text[..idx])
}

//! Page fetching and link discovery capabilities
//!
//! The orchestrator talks to pages only through the [`Fetcher`] trait, which
//! is constructed by the caller and injected, so its lifecycle (`open` and
//! `close`) belongs to whoever owns the run. [`HttpFetcher`] is the built-in
//! implementation over `reqwest`; it returns server-rendered HTML and does not
//! execute JavaScript.

use crate::config::FetcherConfig;
use crate::crawler::parser::extract_links;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Fetcher is not open")]
    NotOpen,

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// A fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL of the page, after redirects
    pub url: String,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Fetch and link-discovery capability used by the crawl orchestrator
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Acquires whatever resources the fetcher needs (clients, browsers)
    async fn open(&self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Releases the resources acquired by `open`
    async fn close(&self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Fetches the fully rendered page at `url`
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Returns all hyperlink targets found on a fetched page
    ///
    /// The default implementation parses the page body and resolves links
    /// against the page's final URL.
    async fn discover_links(&self, page: &FetchedPage) -> Result<Vec<String>, FetchError> {
        let base = Url::parse(&page.url).map_err(|e| FetchError::InvalidUrl {
            url: page.url.clone(),
            message: e.to_string(),
        })?;
        let html = String::from_utf8_lossy(&page.body);
        Ok(extract_links(&html, &base))
    }
}

/// Fetcher backed by a `reqwest` HTTP client
#[derive(Debug)]
pub struct HttpFetcher {
    config: FetcherConfig,
    client: RwLock<Option<Client>>,
}

impl HttpFetcher {
    /// Creates a closed fetcher; call [`Fetcher::open`] before fetching
    pub fn new(config: FetcherConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
        }
    }

    fn client(&self) -> Result<Client, FetchError> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(FetchError::NotOpen)
    }
}

/// Builds the HTTP client used by [`HttpFetcher`]
///
/// # Example
///
/// ```
/// use web_rollup::config::FetcherConfig;
/// use web_rollup::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config.user_agent.clone().unwrap_or_else(|| {
        format!(
            "{}/{} (+https://crates.io/crates/{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_NAME")
        )
    });

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn open(&self) -> Result<(), FetchError> {
        let client = build_http_client(&self.config).map_err(FetchError::Client)?;
        *self.client.write().unwrap_or_else(PoisonError::into_inner) = Some(client);
        tracing::debug!("HTTP fetcher opened");
        Ok(())
    }

    async fn close(&self) -> Result<(), FetchError> {
        self.client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::debug!("HTTP fetcher closed");
        Ok(())
    }

    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let client = self.client()?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(FetchedPage {
            url: final_url,
            body: body.to_vec(),
        })
    }
}

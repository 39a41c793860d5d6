//! Page fetching
//!
//! The crawl core only needs raw HTML for a URL. [`PageFetcher`] is that
//! capability; [`HttpFetcher`] is the reqwest-backed implementation used by
//! the binary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::FetcherConfig;

/// Errors raised while fetching pages or images
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetcher used before open()")]
    NotOpen,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Returns the HTML of a page
///
/// `open` acquires whatever session the fetcher needs and `close` releases
/// it. `close` must be safe to call even when `open` failed or was never
/// called.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn open(&mut self) -> Result<(), FetchError>;

    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    async fn close(&mut self);
}

/// Builds an HTTP client with the configured user agent and timeout
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP page fetcher; redirects are followed by reqwest
pub struct HttpFetcher {
    config: FetcherConfig,
    client: Option<Client>,
}

impl HttpFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn open(&mut self) -> Result<(), FetchError> {
        if self.client.is_none() {
            self.client = Some(build_http_client(&self.config)?);
            debug!("HTTP session opened");
        }
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::NotOpen)?;

        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            debug!("HTTP session closed");
        }
    }
}

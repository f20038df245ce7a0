//! Where the blank W-4 comes from.
//!
//! The service fetches the current form from its publisher on every request.
//! [`DocumentSource`] is the seam for that fetch so tests and offline tools can
//! hand in bytes directly.

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Boxed future returned by [`DocumentSource::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;

/// Provider of the blank source document.
pub trait DocumentSource: Send + Sync {
    /// Fetch the document bytes.
    fn fetch(&self) -> FetchFuture<'_>;
}

/// Fetches the form over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpDocumentSource {
    client: reqwest::Client,
    url: String,
    attempts: u32,
    retry_delay: Duration,
}

impl HttpDocumentSource {
    /// Create a source for `url` with a single attempt and a 30 second timeout.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::from_config(&ServiceConfig::new().with_source_url(url))
    }

    /// Create a source from the service configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.source_url.clone(),
            attempts: config.fetch_attempts.max(1),
            retry_delay: config.retry_delay,
        })
    }

    /// The URL being fetched.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::UpstreamFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamFetch(format!("{} returned {}", self.url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::UpstreamFetch(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl DocumentSource for HttpDocumentSource {
    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(retry(self.attempts, self.retry_delay, move || self.fetch_once()))
    }
}

/// Serves a document already in memory.
#[derive(Debug, Clone)]
pub struct StaticDocumentSource {
    bytes: Arc<Vec<u8>>,
}

impl StaticDocumentSource {
    /// Wrap document bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::new(bytes.into()),
        }
    }

    /// Read a document from disk once.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }
}

impl DocumentSource for StaticDocumentSource {
    fn fetch(&self) -> FetchFuture<'_> {
        let bytes = self.bytes.as_ref().clone();
        Box::pin(async move { Ok(bytes) })
    }
}

/// Run `op` up to `attempts` times, sleeping `delay` between failures.
async fn retry<F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Result<Vec<u8>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<u8>>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if attempt < attempts => {
                log::warn!("Fetch attempt {}/{} failed: {}", attempt, attempts, e);
                tokio::time::sleep(delay).await;
                attempt += 1;
            },
            Err(e) => return Err(e),
        }
    }
}

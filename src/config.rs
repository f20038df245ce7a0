//! Configuration for the W-4 service.

use crate::catalog::FormProfile;
use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Where the blank form is published.
pub const DEFAULT_SOURCE_URL: &str = "https://www.irs.gov/pub/irs-pdf/fw4.pdf";

/// File name offered to the browser.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "W4-2026-TaxFlow.pdf";

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,

    /// URL of the blank source form.
    pub source_url: String,

    /// Attachment file name for generated documents.
    pub download_filename: String,

    /// Attempts per source fetch; 1 disables retry.
    pub fetch_attempts: u32,

    /// Timeout for each fetch attempt.
    pub fetch_timeout: Duration,

    /// Delay between fetch attempts.
    pub retry_delay: Duration,

    /// Optional JSON form profile replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            download_filename: DEFAULT_DOWNLOAD_FILENAME.to_string(),
            fetch_attempts: 1,
            fetch_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_millis(500),
            catalog_path: None,
        }
    }

    /// Read configuration from `W4_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(addr) = lookup("W4_BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("W4_BIND_ADDR: '{}'", addr)))?;
        }
        if let Some(url) = lookup("W4_SOURCE_URL") {
            config.source_url = url;
        }
        if let Some(name) = lookup("W4_DOWNLOAD_FILENAME") {
            config.download_filename = name;
        }
        if let Some(attempts) = lookup("W4_FETCH_ATTEMPTS") {
            config.fetch_attempts = attempts
                .parse()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| {
                    Error::InvalidConfig(format!("W4_FETCH_ATTEMPTS: '{}'", attempts))
                })?;
        }
        if let Some(secs) = lookup("W4_FETCH_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("W4_FETCH_TIMEOUT_SECS: '{}'", secs)))?;
            config.fetch_timeout = Duration::from_secs(secs);
        }
        config.catalog_path = lookup("W4_CATALOG_PATH").map(PathBuf::from);

        Ok(config)
    }

    /// Set the listen address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the source form URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Set the attachment file name.
    pub fn with_download_filename(mut self, name: impl Into<String>) -> Self {
        self.download_filename = name.into();
        self
    }

    /// Set attempts per fetch.
    pub fn with_fetch_attempts(mut self, attempts: u32) -> Self {
        self.fetch_attempts = attempts.max(1);
        self
    }

    /// Set the per-attempt fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Use a form profile from a JSON file.
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// Load the configured form profile, or the built-in one.
    pub fn load_profile(&self) -> Result<FormProfile> {
        match &self.catalog_path {
            Some(path) => FormProfile::load(path),
            None => Ok(FormProfile::default()),
        }
    }
}

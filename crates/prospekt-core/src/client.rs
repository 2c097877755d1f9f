//! HTTP transports for Prospekt Scraper
//!
//! Pages are retrieved through two small capabilities:
//! - [`FetchPage`] for blocking retrieval on the calling thread
//! - [`FetchPageAsync`] for suspending retrieval over a shared session
//!
//! [`BlockingClient`] and [`Session`] implement them on top of reqwest.
//! Neither retries; a failed request is returned to the caller as is.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{ProspektError, Result};

/// Default User-Agent mimicking a modern browser
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default Accept-Language header for German content
const DEFAULT_ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9,en;q=0.8";

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Blocking page retrieval
pub trait FetchPage {
    /// Retrieve the raw body of `url`.
    fn fetch_page(&self, url: &str) -> Result<Vec<u8>>;
}

/// Suspending page retrieval
pub trait FetchPageAsync {
    /// Retrieve the raw body of `url`.
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Configuration for the HTTP transports
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds for blocking requests (default: 10)
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Accept-Language header sent with every request
    pub accept_language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

impl ClientConfig {
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        let language = HeaderValue::from_str(&self.accept_language).map_err(|_| {
            ProspektError::InvalidConfig(format!(
                "invalid Accept-Language header: {}",
                self.accept_language
            ))
        })?;
        headers.insert(ACCEPT_LANGUAGE, language);
        Ok(headers)
    }
}

/// Map a response status to an error, or `None` on success.
fn check_status(status: StatusCode, url: &str) -> Option<ProspektError> {
    if status.is_success() {
        None
    } else if status == StatusCode::NOT_FOUND {
        Some(ProspektError::NotFound(url.to_string()))
    } else {
        Some(ProspektError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Blocking HTTP client with a fixed per-request timeout
///
/// Must not be created or used from inside an async runtime; run it on a
/// plain thread or inside `tokio::task::spawn_blocking`.
pub struct BlockingClient {
    client: reqwest::blocking::Client,
}

impl BlockingClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(config.default_headers()?)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

impl FetchPage for BlockingClient {
    fn fetch_page(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "GET (blocking)");
        let response = self.client.get(url).send()?;

        if let Some(error) = check_status(response.status(), url) {
            return Err(error);
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// Shared async HTTP session for one run
///
/// Cloning is cheap and shares the connection pool. The session has no
/// request timeout.
#[derive(Clone)]
pub struct Session {
    client: reqwest::Client,
}

impl Session {
    /// Open a session with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Open a session with custom configuration. `timeout_secs` is ignored.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(config.default_headers()?)
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }
}

impl FetchPageAsync for Session {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;

        if let Some(error) = check_status(response.status(), url) {
            return Err(error);
        }

        Ok(response.bytes().await?.to_vec())
    }
}

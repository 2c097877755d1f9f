//! Main Prospekt Scraper API
//!
//! Runs the whole pipeline for one root listing page: discover the
//! categories, fetch each category page once, and collect the records of
//! every flyer tile. Two execution modes are offered:
//! - [`ProspektScraper::collect_blocking`] fetches on the calling thread
//! - [`ProspektScraper::collect`] fetches through one shared async session
//!
//! Both abort on the first transport error; nothing is retried.

use std::pin::pin;

use futures::StreamExt;
use tracing::info;

use crate::catalog::Catalog;
use crate::client::{BlockingClient, ClientConfig, Session};
use crate::error::Result;
use crate::types::Prospect;

/// Main scraper API for prospektmaschine.de style listings
///
/// # Example
/// ```no_run
/// use prospekt_core::ProspektScraper;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let scraper = ProspektScraper::new();
///
///     let prospects = scraper
///         .collect("https://www.prospektmaschine.de/hypermarkte/")
///         .await?;
///     println!("Found {} prospects", prospects.len());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProspektScraper {
    config: ClientConfig,
}

impl ProspektScraper {
    /// Create a new scraper with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new scraper with a custom client configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Client configuration used for every run
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Collect all prospects below `root_url`, fetching on the calling
    /// thread with the configured timeout.
    ///
    /// Must not be called from inside an async runtime.
    ///
    /// # Arguments
    /// * `root_url` - Absolute URL of the listing page whose sidebar links
    ///   the categories
    ///
    /// # Returns
    /// * `Ok(Vec<Prospect>)` with every category's records, in sidebar order
    /// * `Err(ProspektError::InvalidUrl)` if `root_url` is not absolute
    /// * `Err(ProspektError::Discovery)` if the root page has no categories
    /// * the first transport error of any request
    ///
    /// # Example
    /// ```no_run
    /// use prospekt_core::ProspektScraper;
    ///
    /// # fn example() -> Result<(), prospekt_core::ProspektError> {
    /// let scraper = ProspektScraper::new();
    /// let prospects = scraper.collect_blocking("https://www.prospektmaschine.de/hypermarkte/")?;
    /// for prospect in &prospects {
    ///     println!("{}: {}", prospect.shop_name, prospect.title);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn collect_blocking(&self, root_url: &str) -> Result<Vec<Prospect>> {
        let client = BlockingClient::with_config(&self.config)?;
        let mut catalog = Catalog::discover(root_url, &client)?;

        let mut prospects = Vec::new();
        for category in catalog.categories(&client) {
            prospects.extend(category?.records());
        }

        info!(
            root = root_url,
            categories = catalog.len(),
            prospects = prospects.len(),
            "collection finished"
        );
        Ok(prospects)
    }

    /// Collect all prospects below `root_url` through one async session.
    ///
    /// The session lives for this call only. Categories are fetched one at
    /// a time, in sidebar order. The returned future is `Send`, so it can
    /// run on a spawned task.
    ///
    /// # Arguments
    /// * `root_url` - Absolute URL of the listing page whose sidebar links
    ///   the categories
    ///
    /// # Returns
    /// * `Ok(Vec<Prospect>)` with every category's records, in sidebar order
    /// * `Err(ProspektError::InvalidUrl)` if `root_url` is not absolute
    /// * `Err(ProspektError::Discovery)` if the root page has no categories
    /// * the first transport error of any request
    ///
    /// # Example
    /// ```no_run
    /// use prospekt_core::ProspektScraper;
    ///
    /// # async fn example() -> Result<(), prospekt_core::ProspektError> {
    /// let handle = tokio::spawn(async {
    ///     ProspektScraper::new()
    ///         .collect("https://www.prospektmaschine.de/hypermarkte/")
    ///         .await
    /// });
    /// let prospects = handle.await.expect("task panicked")?;
    /// println!("Found {} prospects", prospects.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn collect(&self, root_url: &str) -> Result<Vec<Prospect>> {
        let session = Session::with_config(&self.config)?;
        let mut catalog = Catalog::discover_async(root_url, &session).await?;
        let categories = catalog.len();

        let mut prospects = Vec::new();
        let mut batches = pin!(catalog.batches(&session));
        while let Some(batch) = batches.next().await {
            prospects.extend(batch?);
        }

        info!(
            root = root_url,
            categories,
            prospects = prospects.len(),
            "collection finished"
        );
        Ok(prospects)
    }
}

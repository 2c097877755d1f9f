//! Category discovery
//!
//! A [`Catalog`] is built once from the root page's sidebar and holds one
//! [`CategoryExtractor`] per discovered category, in the sidebar's order.

use std::fmt;

use futures::stream::{self, Stream};
use tracing::info;
use url::Url;

use crate::client::{FetchPage, FetchPageAsync};
use crate::error::{ProspektError, Result};
use crate::extractor::CategoryExtractor;
use crate::parser::parse_categories;
use crate::types::{CategoryEndpoint, Prospect};

/// All categories linked from a root listing page
pub struct Catalog {
    root_url: Url,
    extractors: Vec<CategoryExtractor>,
}

impl Catalog {
    /// Build a catalog from an already retrieved root page.
    ///
    /// # Errors
    /// - `ProspektError::InvalidUrl` if `root_url` is not an absolute URL
    /// - `ProspektError::Discovery` if the page has no category navigation
    pub fn from_html(root_url: &str, html: &str) -> Result<Self> {
        let root_url = parse_root_url(root_url)?;
        let endpoints = parse_categories(html, &root_url)?;
        info!(root = %root_url, categories = endpoints.len(), "categories discovered");

        Ok(Self {
            root_url,
            extractors: endpoints.into_iter().map(CategoryExtractor::new).collect(),
        })
    }

    /// Fetch the root page on the calling thread and discover its categories.
    ///
    /// # Arguments
    /// * `root_url` - Absolute URL of the listing page
    /// * `fetcher` - Blocking transport, usually a [`BlockingClient`]
    ///
    /// # Returns
    /// * `Ok(Catalog)` with one unfetched extractor per category
    /// * `Err(ProspektError::InvalidUrl)` if `root_url` is not absolute
    /// * `Err(ProspektError::Discovery)` if the page has no category navigation
    /// * transport errors from `fetcher`
    ///
    /// # Example
    /// ```no_run
    /// use prospekt_core::{BlockingClient, Catalog};
    ///
    /// # fn example() -> Result<(), prospekt_core::ProspektError> {
    /// let client = BlockingClient::new()?;
    /// let catalog = Catalog::discover("https://www.prospektmaschine.de/hypermarkte/", &client)?;
    /// for endpoint in catalog.endpoints() {
    ///     println!("{} -> {}", endpoint.shop_name, endpoint.url);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// [`BlockingClient`]: crate::client::BlockingClient
    pub fn discover<F: FetchPage>(root_url: &str, fetcher: &F) -> Result<Self> {
        let url = parse_root_url(root_url)?;
        let body = fetcher.fetch_page(url.as_str())?;
        Self::from_html(url.as_str(), &String::from_utf8_lossy(&body))
    }

    /// Fetch the root page through an async session and discover its
    /// categories.
    ///
    /// # Arguments
    /// * `root_url` - Absolute URL of the listing page
    /// * `session` - Async transport shared with the later category fetches
    ///
    /// # Returns
    /// * `Ok(Catalog)` with one unfetched extractor per category
    /// * `Err(ProspektError::InvalidUrl)` if `root_url` is not absolute
    /// * `Err(ProspektError::Discovery)` if the page has no category navigation
    /// * transport errors from `session`
    ///
    /// # Example
    /// ```no_run
    /// use prospekt_core::{Catalog, Session};
    ///
    /// # async fn example() -> Result<(), prospekt_core::ProspektError> {
    /// let session = Session::new()?;
    /// let catalog =
    ///     Catalog::discover_async("https://www.prospektmaschine.de/hypermarkte/", &session).await?;
    /// println!("{catalog}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn discover_async<S: FetchPageAsync>(root_url: &str, session: &S) -> Result<Self> {
        let url = parse_root_url(root_url)?;
        let body = session.fetch_page(url.as_str()).await?;
        Self::from_html(url.as_str(), &String::from_utf8_lossy(&body))
    }

    /// The root page URL
    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    /// Discovered categories, in sidebar order
    pub fn endpoints(&self) -> impl Iterator<Item = &CategoryEndpoint> {
        self.extractors.iter().map(CategoryExtractor::endpoint)
    }

    /// Number of discovered categories
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether no category was discovered. Never true for a catalog built
    /// by discovery.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Number of categories fetched so far
    pub fn fetched_count(&self) -> usize {
        self.extractors
            .iter()
            .filter(|extractor| extractor.is_fetched())
            .count()
    }

    /// Look up a category by shop name without fetching it.
    pub fn category(&self, shop_name: &str) -> Option<&CategoryExtractor> {
        self.extractors
            .iter()
            .find(|extractor| extractor.endpoint().shop_name == shop_name)
    }

    /// Look up a category by shop name and fetch it on the calling thread.
    ///
    /// A category that was already fetched is returned without a request.
    ///
    /// # Arguments
    /// * `shop_name` - Shop name as derived from the sidebar link (`"rewe"`)
    /// * `fetcher` - Blocking transport
    ///
    /// # Returns
    /// * `Ok(&CategoryExtractor)` ready to produce records
    /// * `Err(ProspektError::UnknownShop)` if no category has this shop name
    /// * transport errors from `fetcher`
    ///
    /// # Example
    /// ```no_run
    /// use prospekt_core::{BlockingClient, Catalog};
    ///
    /// # fn example() -> Result<(), prospekt_core::ProspektError> {
    /// let client = BlockingClient::new()?;
    /// let mut catalog = Catalog::discover("https://www.prospektmaschine.de/hypermarkte/", &client)?;
    /// let rewe = catalog.get_category("rewe", &client)?;
    /// for prospect in rewe.records() {
    ///     println!("{} ({} - {})", prospect.title, prospect.valid_from, prospect.valid_to);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_category<F: FetchPage>(
        &mut self,
        shop_name: &str,
        fetcher: &F,
    ) -> Result<&CategoryExtractor> {
        let extractor = self
            .extractors
            .iter_mut()
            .find(|extractor| extractor.endpoint().shop_name == shop_name)
            .ok_or_else(|| ProspektError::UnknownShop(shop_name.to_string()))?;

        let fetched = extractor.fetch(fetcher)?;
        Ok(&*fetched)
    }

    /// Fetch every category on the calling thread, one after another.
    ///
    /// Each item is the fetched extractor, or the error that fetching it
    /// produced. Categories already fetched are not requested again.
    pub fn categories<'a, F: FetchPage>(
        &'a mut self,
        fetcher: &'a F,
    ) -> impl Iterator<Item = Result<&'a CategoryExtractor>> + 'a {
        self.extractors
            .iter_mut()
            .map(move |extractor| extractor.fetch(fetcher).map(|fetched| &*fetched))
    }

    /// Fetch every category through `session`, one request at a time, and
    /// yield each category's records as soon as its page has arrived.
    ///
    /// Batches follow sidebar order; records inside a batch follow
    /// document order.
    pub fn batches<'a, S: FetchPageAsync>(
        &'a mut self,
        session: &'a S,
    ) -> impl Stream<Item = Result<Vec<Prospect>>> + 'a {
        stream::unfold(self.extractors.iter_mut(), move |mut remaining| async move {
            let extractor = remaining.next()?;
            let batch = extractor
                .fetch_async(session)
                .await
                .map(|fetched| fetched.records().collect::<Vec<_>>());
            Some((batch, remaining))
        })
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Catalog<{}, fetched={}/{}>",
            self.root_url,
            self.fetched_count(),
            self.len()
        )
    }
}

fn parse_root_url(root_url: &str) -> Result<Url> {
    Url::parse(root_url.trim())
        .map_err(|error| ProspektError::InvalidUrl(format!("{root_url}: {error}")))
}

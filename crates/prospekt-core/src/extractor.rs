//! Per-category fetch state
//!
//! A [`CategoryExtractor`] owns one category page. The page is fetched at
//! most once; afterwards the parsed document is kept and the records are
//! produced from it on demand.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime, SubsecRound};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::client::{FetchPage, FetchPageAsync};
use crate::error::Result;
use crate::parser::{is_tile_class, TileLayout, TileParser};
use crate::types::{CategoryEndpoint, Prospect};

static ANY_ELEMENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("*").expect("valid universal selector"));

/// Format of the fetch date in the `Display` output
const FETCHED_AT_FORMAT: &str = "%d.%m.%Y";

enum FetchState {
    Unfetched,
    Fetched(FetchedPage),
}

struct FetchedPage {
    document: Html,
    fetched_at: NaiveDateTime,
    tile_count: usize,
}

impl FetchedPage {
    fn parse(body: &[u8]) -> Self {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);
        let fetched_at = Local::now().naive_local().trunc_subsecs(0);
        let tile_count = tiles(&document).count();

        Self {
            document,
            fetched_at,
            tile_count,
        }
    }
}

/// Flyer tiles of a document, in document order.
fn tiles(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .select(&ANY_ELEMENT)
        .filter(|element| is_tile_class(element.value().classes()))
}

/// Fetch-once wrapper around one category page
///
/// # Example
/// ```no_run
/// use prospekt_core::{BlockingClient, CategoryEndpoint, CategoryExtractor};
///
/// # fn example() -> prospekt_core::Result<()> {
/// let client = BlockingClient::new()?;
/// let mut rewe = CategoryExtractor::new(CategoryEndpoint::new(
///     "https://www.prospektmaschine.de/rewe/",
///     "rewe",
/// ));
/// for prospect in rewe.fetch(&client)?.records() {
///     println!("{} ({} - {})", prospect.title, prospect.valid_from, prospect.valid_to);
/// }
/// # Ok(())
/// # }
/// ```
pub struct CategoryExtractor {
    endpoint: CategoryEndpoint,
    parser: TileParser,
    state: FetchState,
}

impl CategoryExtractor {
    /// Create an unfetched extractor for a single-shop category page.
    pub fn new(endpoint: CategoryEndpoint) -> Self {
        Self {
            endpoint,
            parser: TileParser::default(),
            state: FetchState::Unfetched,
        }
    }

    /// Use a different tile layout for this page.
    pub fn with_layout(mut self, layout: TileLayout) -> Self {
        self.parser = TileParser::new(layout);
        self
    }

    /// The category this extractor reads
    pub fn endpoint(&self) -> &CategoryEndpoint {
        &self.endpoint
    }

    /// Whether the page has been fetched
    pub fn is_fetched(&self) -> bool {
        matches!(self.state, FetchState::Fetched(_))
    }

    /// When the page was fetched, `None` before fetching
    pub fn fetched_at(&self) -> Option<NaiveDateTime> {
        match &self.state {
            FetchState::Fetched(page) => Some(page.fetched_at),
            FetchState::Unfetched => None,
        }
    }

    /// Number of flyer tiles on the fetched page, 0 before fetching
    pub fn tile_count(&self) -> usize {
        match &self.state {
            FetchState::Fetched(page) => page.tile_count,
            FetchState::Unfetched => 0,
        }
    }

    /// Fetch the page on the calling thread.
    ///
    /// Does nothing if the page was already fetched.
    ///
    /// # Arguments
    /// * `fetcher` - Blocking transport
    ///
    /// # Returns
    /// * `Ok(&mut Self)` so records can be read straight away
    /// * any transport error from `fetcher`; the extractor stays unfetched
    pub fn fetch<F: FetchPage>(&mut self, fetcher: &F) -> Result<&mut Self> {
        if self.is_fetched() {
            debug!(url = %self.endpoint.url, "category already fetched");
            return Ok(self);
        }

        let body = fetcher.fetch_page(&self.endpoint.url)?;
        self.store(&body);
        Ok(self)
    }

    /// Fetch the page through a shared async session.
    ///
    /// Does nothing if the page was already fetched.
    ///
    /// # Arguments
    /// * `session` - Async transport, shared by every category of a run
    ///
    /// # Returns
    /// * `Ok(&mut Self)` so records can be read straight away
    /// * any transport error from `session`; the extractor stays unfetched
    ///
    /// # Example
    /// ```no_run
    /// use prospekt_core::{CategoryEndpoint, CategoryExtractor, Session};
    ///
    /// # async fn example() -> Result<(), prospekt_core::ProspektError> {
    /// let session = Session::new()?;
    /// let mut globus = CategoryExtractor::new(CategoryEndpoint::new(
    ///     "https://www.prospektmaschine.de/globus/",
    ///     "globus",
    /// ));
    /// let count = globus.fetch_async(&session).await?.records().count();
    /// println!("{count} prospects");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_async<S: FetchPageAsync>(&mut self, session: &S) -> Result<&mut Self> {
        if self.is_fetched() {
            debug!(url = %self.endpoint.url, "category already fetched");
            return Ok(self);
        }

        let body = session.fetch_page(&self.endpoint.url).await?;
        self.store(&body);
        Ok(self)
    }

    fn store(&mut self, body: &[u8]) {
        let page = FetchedPage::parse(body);
        info!(
            url = %self.endpoint.url,
            tiles = page.tile_count,
            "category fetched"
        );
        self.state = FetchState::Fetched(page);
    }

    /// Records of the fetched page, in document order.
    ///
    /// Empty before the page is fetched. Every call starts a fresh pass
    /// over the cached document; nothing is fetched again.
    pub fn records(&self) -> impl Iterator<Item = Prospect> + '_ {
        let page = match &self.state {
            FetchState::Fetched(page) => Some(page),
            FetchState::Unfetched => None,
        };

        page.into_iter().flat_map(move |page| {
            tiles(&page.document).map(move |tile| {
                self.parser
                    .parse(&tile, &self.endpoint.shop_name, page.fetched_at)
            })
        })
    }
}

impl fmt::Display for CategoryExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fetched_at() {
            Some(at) => write!(
                f,
                "CategoryExtractor<{}, fetched_at={}>",
                self.endpoint.url,
                at.format(FETCHED_AT_FORMAT)
            ),
            None => write!(f, "CategoryExtractor<{}, fetched_at=never>", self.endpoint.url),
        }
    }
}

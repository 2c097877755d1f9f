//! Category navigation parser
//!
//! Reads the category links out of the root page's sidebar.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::node::TagNode;
use crate::error::{ProspektError, Result};
use crate::types::CategoryEndpoint;

static SIDEBAR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#sidebar").expect("valid sidebar selector"));
static CATEGORIES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".list-unstyled.categories").expect("valid categories selector")
});
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));

/// Shop name of a category link: the href with every `/` removed.
///
/// # Examples
/// ```
/// use prospekt_core::parser::shop_name_from_href;
///
/// assert_eq!(shop_name_from_href("/rewe/"), "rewe");
/// assert_eq!(shop_name_from_href("kaufland"), "kaufland");
/// ```
pub fn shop_name_from_href(href: &str) -> String {
    href.replace('/', "")
}

/// Parse the category endpoints out of the root page.
///
/// Links are resolved against `root_url` and returned in document order.
/// Links without a usable `href` are skipped. A shop listed more than once
/// keeps the position of its first link.
///
/// # Errors
/// `ProspektError::Discovery` if the sidebar, the category list, or its
/// links are missing.
pub fn parse_categories(html: &str, root_url: &Url) -> Result<Vec<CategoryEndpoint>> {
    let document = Html::parse_document(html);

    let sidebar = document
        .select(&SIDEBAR)
        .next()
        .ok_or_else(|| ProspektError::Discovery("sidebar not found".to_string()))?;
    let categories = sidebar
        .find_first(&CATEGORIES)
        .ok_or_else(|| ProspektError::Discovery("category list not found".to_string()))?;

    let anchors = categories.find_all(&ANCHOR);
    if anchors.is_empty() {
        return Err(ProspektError::Discovery(
            "category list contains no links".to_string(),
        ));
    }

    let mut endpoints = Vec::with_capacity(anchors.len());
    let mut seen = HashSet::new();
    for anchor in &anchors {
        let Some(href) = anchor.attribute("href") else {
            warn!("category link without href skipped");
            continue;
        };
        let href = href.trim();
        let shop_name = shop_name_from_href(href);
        if seen.contains(&shop_name) {
            debug!(href, "duplicate category link skipped");
            continue;
        }

        match root_url.join(href) {
            Ok(url) => {
                seen.insert(shop_name.clone());
                endpoints.push(CategoryEndpoint::new(url, shop_name));
            }
            Err(error) => warn!(href, %error, "category link cannot be resolved"),
        }
    }

    if endpoints.is_empty() {
        return Err(ProspektError::Discovery(
            "no category link could be resolved".to_string(),
        ));
    }

    Ok(endpoints)
}

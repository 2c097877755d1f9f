//! Flyer tile parser
//!
//! Turns one `brochure-thumb*` tile into a [`Prospect`]. Parsing never
//! fails: every piece of data that cannot be located is replaced with a
//! placeholder (`"not found"`, 1970-01-01), so one broken tile never drops
//! the rest of a category.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex_lite::Regex;
use scraper::Selector;
use tracing::debug;

use super::node::TagNode;
use crate::types::{epoch, Prospect, NOT_FOUND};

/// Date format of the validity text (e.g. `01.03.2024`)
pub const VALIDITY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Separator between the two dates of the validity text
pub const VALIDITY_SEPARATOR: &str = " - ";

static TILE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^brochure-thumb").expect("valid tile class regex"));

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong").expect("valid title selector"));
static PICTURE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("picture").expect("valid picture selector"));
static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));
static VALIDITY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".hidden-sm").expect("valid validity selector"));

/// Whether an element with these classes is a flyer tile.
///
/// A tile carries at least one class starting with `brochure-thumb`
/// (case sensitive).
pub fn is_tile_class<'c>(mut classes: impl Iterator<Item = &'c str>) -> bool {
    classes.any(|class| TILE_CLASS_RE.is_match(class))
}

/// Where the shop name of a record comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopNameSource {
    /// The name the caller already knows (the category being parsed)
    Caller,
    /// Last word of the shop logo's `alt` text inside the tile
    LogoAlt,
}

/// Tile shape the parser expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    /// Number of `picture` elements a well-formed tile contains. Only
    /// enforced when the shop name is read from the logo; otherwise the
    /// first picture is the flyer, whatever follows it.
    pub expected_pictures: usize,
    /// Source of the record's shop name
    pub shop_name_source: ShopNameSource,
}

impl TileLayout {
    /// Tile on a single shop's category page: flyer picture first, often
    /// followed by the shop logo; shop name known from the category.
    pub const SINGLE_SHOP: Self = Self {
        expected_pictures: 1,
        shop_name_source: ShopNameSource::Caller,
    };

    /// Tile on a listing mixing several shops: flyer picture followed by
    /// the shop logo, whose `alt` text ends with the shop name.
    pub const MULTI_SHOP: Self = Self {
        expected_pictures: 2,
        shop_name_source: ShopNameSource::LogoAlt,
    };
}

impl Default for TileLayout {
    fn default() -> Self {
        Self::SINGLE_SHOP
    }
}

/// Tolerant converter from tile markup to [`Prospect`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TileParser {
    layout: TileLayout,
}

impl TileParser {
    /// Create a parser for the given tile shape
    pub fn new(layout: TileLayout) -> Self {
        Self { layout }
    }

    /// Tile shape this parser expects
    pub fn layout(&self) -> TileLayout {
        self.layout
    }

    /// Parse one tile.
    ///
    /// `shop_name` is used whenever the layout takes the name from the
    /// caller, or the logo text is unusable. Never fails.
    pub fn parse<N: TagNode>(&self, tile: &N, shop_name: &str, fetched_at: NaiveDateTime) -> Prospect {
        let title = extract_title(tile).unwrap_or_else(|| NOT_FOUND.to_string());

        let pictures = tile.find_all(&PICTURE);
        let (thumbnail_url, shop_name) = match self.layout.shop_name_source {
            ShopNameSource::Caller => {
                (pictures.first().and_then(picture_source), shop_name.to_string())
            }
            ShopNameSource::LogoAlt if pictures.len() == self.layout.expected_pictures => {
                let shop = pictures.last().and_then(logo_shop_name);
                (
                    pictures.first().and_then(picture_source),
                    shop.unwrap_or_else(|| shop_name.to_string()),
                )
            }
            ShopNameSource::LogoAlt => {
                debug!(
                    found = pictures.len(),
                    expected = self.layout.expected_pictures,
                    "tile picture count does not match layout"
                );
                (None, shop_name.to_string())
            }
        };

        let (valid_from, valid_to) = tile
            .next_matching(&VALIDITY)
            .and_then(|element| parse_validity(&element.text()))
            .unwrap_or_else(|| (epoch(), epoch()));

        Prospect {
            title,
            thumbnail_url: thumbnail_url.unwrap_or_else(|| NOT_FOUND.to_string()),
            shop_name,
            valid_from,
            valid_to,
            parsed_at: fetched_at,
        }
    }
}

/// Text of the nearest following `strong` element.
fn extract_title<N: TagNode>(tile: &N) -> Option<String> {
    let text = tile.next_matching(&TITLE)?.text();
    let title = text.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// `src` of the picture's image, falling back to `data-src`.
fn picture_source<N: TagNode>(picture: &N) -> Option<String> {
    let img = picture.find_first(&IMG)?;
    ["src", "data-src"]
        .into_iter()
        .filter_map(|name| img.attribute(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Last whitespace separated word of the logo's `alt` text.
fn logo_shop_name<N: TagNode>(picture: &N) -> Option<String> {
    let alt = picture.find_first(&IMG)?.attribute("alt")?;
    alt.split_whitespace().last().map(str::to_string)
}

/// Parse a validity text such as `01.03.2024 - 15.03.2024`.
///
/// Returns `None` unless the text splits into exactly two parts that both
/// parse as `DD.MM.YYYY`.
pub fn parse_validity(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    let parts: Vec<&str> = text.trim().split(VALIDITY_SEPARATOR).collect();
    let [from, to] = parts.as_slice() else {
        return None;
    };

    let from = NaiveDate::parse_from_str(from.trim(), VALIDITY_DATE_FORMAT).ok()?;
    let to = NaiveDate::parse_from_str(to.trim(), VALIDITY_DATE_FORMAT).ok()?;
    Some((from, to))
}

//! Data types for Prospekt Scraper
//!
//! `Prospect` is the exported record. Every field is always populated:
//! missing source data is stored as a placeholder (`"not found"` or the
//! Unix epoch date) so the JSON output never contains nulls.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Placeholder for text that could not be extracted from a tile
pub const NOT_FOUND: &str = "not found";

/// Output format of `valid_from` / `valid_to`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Output format of `parsed_time`
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder for a date that could not be extracted (1970-01-01)
pub fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// One flyer listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prospect {
    /// Flyer headline
    pub title: String,
    /// Thumbnail image URL as found in the markup
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    /// Shop/vendor name
    pub shop_name: String,
    /// First day the offers are valid
    #[serde(with = "date_format")]
    pub valid_from: NaiveDate,
    /// Last day the offers are valid
    #[serde(with = "date_format")]
    pub valid_to: NaiveDate,
    /// When the category page was fetched, whole seconds
    #[serde(rename = "parsed_time", with = "datetime_format")]
    pub parsed_at: NaiveDateTime,
}

impl Prospect {
    /// Convert to the exported JSON object.
    ///
    /// Produces the same value as `serde_json::to_value`, without the
    /// fallible round trip through the serializer.
    pub fn to_json(&self) -> Value {
        json!({
            "title": self.title,
            "thumbnail": self.thumbnail_url,
            "shop_name": self.shop_name,
            "valid_from": self.valid_from.format(DATE_FORMAT).to_string(),
            "valid_to": self.valid_to.format(DATE_FORMAT).to_string(),
            "parsed_time": self.parsed_at.format(DATETIME_FORMAT).to_string(),
        })
    }
}

impl fmt::Display for Prospect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prospect<{}, {}>",
            self.shop_name,
            self.parsed_at.format(DATETIME_FORMAT)
        )
    }
}

/// A category page discovered in the root page's navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEndpoint {
    /// Absolute URL of the category page
    pub url: String,
    /// Shop name derived from the link's path
    pub shop_name: String,
}

impl CategoryEndpoint {
    /// Create a new endpoint
    pub fn new(url: impl Into<String>, shop_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            shop_name: shop_name.into(),
        }
    }
}

mod date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATETIME_FORMAT;

    pub fn serialize<S: Serializer>(
        datetime: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&datetime.format(DATETIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

//! Prospekt Scraper Core Library
//!
//! This crate collects promotional flyers ("Prospekte") from
//! prospektmaschine.de style listing sites.
//!
//! # Features
//! - Discover shop categories from the root page's sidebar
//! - Fetch each category page once, blocking or async
//! - Parse flyer tiles tolerantly, with placeholders for missing data
//! - Export the collected records as JSON

pub mod catalog;
pub mod client;
pub mod error;
pub mod export;
pub mod extractor;
pub mod parser;
pub mod scraper;
pub mod types;

// Re-export main types for convenience
pub use catalog::Catalog;
pub use client::{BlockingClient, ClientConfig, FetchPage, FetchPageAsync, Session};
pub use error::{ProspektError, Result};
pub use export::write_json;
pub use extractor::CategoryExtractor;
pub use parser::{ShopNameSource, TileLayout, TileParser};
pub use scraper::ProspektScraper;
pub use types::{CategoryEndpoint, Prospect};

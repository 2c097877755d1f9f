//! Error types for Prospekt Scraper
//!
//! Only structural and network failures surface as errors. Problems inside
//! a single flyer tile never reach this module; the tile parser replaces
//! missing data with placeholder values instead.

use thiserror::Error;

/// Error type for Prospekt Scraper operations
#[derive(Error, Debug)]
pub enum ProspektError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The root page lacks the category navigation. Fatal for the whole run.
    #[error("Category discovery failed: {0}")]
    Discovery(String),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Client configuration cannot be turned into an HTTP client
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Requested page was not found (HTTP 404)
    #[error("Page not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status
    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Shop name is not part of the discovered categories
    #[error("Unknown shop: {0}")]
    UnknownShop(String),

    /// Writing the export failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the export failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Prospekt Scraper operations
pub type Result<T> = std::result::Result<T, ProspektError>;

//! Shared error type for fetching and parsing chapter pages.

use crate::output::OutputError;
use thiserror::Error;

/// Errors that abort a crawl. Content misses are not errors; see [crate::scraper::crawl_novel].
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Failed to download the chapter: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to download the chapter: HTTP {status} when fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not find the novel title (h2.font-white) on the first page: {url}")]
    MissingTitle { url: String },

    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("{0}")]
    Output(#[from] OutputError),
}

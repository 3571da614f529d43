//! Fetching and parsing chapter pages, and the sequential crawl that ties them together.

mod chapter_page;
mod client;
mod crawl;
mod error;
#[cfg(test)]
pub(crate) mod test_support;

pub use chapter_page::{extract_chapter_text, extract_next_chapter_link, parse_novel_title};
pub use client::{PoliteClient, PoliteClientBuilder};
pub use crawl::{crawl_novel, CrawlOptions};
pub use error::ScraperError;

use reqwest::Url;

/// Source of page markup. [PoliteClient] fetches over HTTP; tests serve pages from memory.
pub trait PageFetcher {
    /// Fetch the page at `url` and return its body. Non-success statuses are errors.
    fn fetch(&mut self, url: &Url) -> Result<String, ScraperError>;
}

/// Parse the user-supplied start address. Only absolute http(s) URLs are accepted.
pub fn parse_start_url(input: &str) -> Result<Url, ScraperError> {
    let url = Url::parse(input.trim()).map_err(|e| ScraperError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScraperError::InvalidUrl {
            input: input.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_url_accepts_https() -> Result<(), ScraperError> {
        let url = parse_start_url(" https://site.example/novel/chapter-1 ")?;
        assert_eq!(url.as_str(), "https://site.example/novel/chapter-1");
        Ok(())
    }

    #[test]
    fn start_url_rejects_relative() -> Result<(), String> {
        match parse_start_url("novel/chapter-1") {
            Err(ScraperError::InvalidUrl { input, .. }) if input == "novel/chapter-1" => Ok(()),
            other => Err(format!("expected InvalidUrl, got {:?}", other)),
        }
    }

    #[test]
    fn start_url_rejects_other_schemes() -> Result<(), String> {
        match parse_start_url("ftp://site.example/novel/chapter-1") {
            Err(ScraperError::InvalidUrl { reason, .. }) if reason.contains("ftp") => Ok(()),
            other => Err(format!("expected InvalidUrl, got {:?}", other)),
        }
    }
}

//! In-memory pages for crawl tests.

use crate::scraper::{PageFetcher, ScraperError};
use reqwest::Url;
use std::collections::HashMap;

/// Serves pages from memory and records every requested address. Unknown addresses are 404s.
#[derive(Default)]
pub(crate) struct MemoryFetcher {
    pages: HashMap<String, String>,
    pub(crate) requested: Vec<String>,
}

impl MemoryFetcher {
    pub(crate) fn page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }
}

impl PageFetcher for MemoryFetcher {
    fn fetch(&mut self, url: &Url) -> Result<String, ScraperError> {
        self.requested.push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ScraperError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// Chapter page in the site's template. The nav block carries a "previous" column before the
/// "next" column, as on the live site.
pub(crate) fn chapter_html(title: Option<&str>, next: Option<&str>, paragraphs: &[&str]) -> String {
    let title = title
        .map(|t| format!(r#"<h2 class="font-white">{}</h2>"#, t))
        .unwrap_or_default();
    let nav = next
        .map(|href| {
            format!(
                r#"<div class="row nav-buttons"><div class="col-md-6"><a href="prev">Previous</a></div><div class="col-lg-offset-6 col-md-6"><a href="{}">Next</a></div></div>"#,
                href
            )
        })
        .unwrap_or_default();
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        r#"<html><body>{}{}<div class="chapter-inner chapter-content">{}</div></body></html>"#,
        title, nav, body
    )
}

//! Chapter page parsing: novel title, next-chapter link, and chapter text.
//!
//! All three follow one fixed page template. The navigation block is `div.row.nav-buttons`; its
//! "next" column is `div.col-lg-offset-6`. The title is `h2.font-white`. Chapter paragraphs are the
//! `p` elements inside `div.chapter-inner` or `div.chapter-content`.

use crate::scraper::ScraperError;
use reqwest::Url;
use scraper::{Html, Selector};

const NAV_SELECTOR: &str = "div.row.nav-buttons";
const NEXT_COLUMN_SELECTOR: &str = "div.col-lg-offset-6";
const LINK_SELECTOR: &str = "a[href]";
const TITLE_SELECTOR: &str = "h2.font-white";
const PARAGRAPH_SELECTOR: &str = "div.chapter-inner p, div.chapter-content p";

/// Parse a CSS selector or return a parse error (avoids panics from Selector::parse).
fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::Selector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Novel title from the page header, trimmed. `None` if the element is missing or blank.
pub fn parse_novel_title(html: &str) -> Result<Option<String>, ScraperError> {
    let doc = Html::parse_document(html);
    let title_sel = parse_selector(TITLE_SELECTOR)?;
    Ok(doc
        .select(&title_sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Find the "next chapter" link and resolve it against `base`.
///
/// `base` is the directory of the first chapter, fixed for the whole crawl; it is not the
/// address of the page being parsed. Returns `Ok(None)` when any level of the navigation
/// structure is missing or the href cannot be joined, which marks the last chapter.
pub fn extract_next_chapter_link(html: &str, base: &Url) -> Result<Option<Url>, ScraperError> {
    let doc = Html::parse_document(html);
    let nav_sel = parse_selector(NAV_SELECTOR)?;
    let column_sel = parse_selector(NEXT_COLUMN_SELECTOR)?;
    let link_sel = parse_selector(LINK_SELECTOR)?;

    let href = doc
        .select(&nav_sel)
        .next()
        .and_then(|nav| nav.select(&column_sel).next())
        .and_then(|column| column.select(&link_sel).next())
        .and_then(|a| a.value().attr("href"));
    Ok(href.and_then(|h| base.join(h).ok()))
}

/// Readable chapter text: each paragraph followed by a newline, whole result trimmed.
///
/// A paragraph is emitted once even when its container carries both content classes or the
/// containers nest. Pages without content containers yield an empty string.
pub fn extract_chapter_text(html: &str) -> Result<String, ScraperError> {
    let doc = Html::parse_document(html);
    let p_sel = parse_selector(PARAGRAPH_SELECTOR)?;
    let mut text = String::new();
    for p in doc.select(&p_sel) {
        text.extend(p.text());
        text.push('\n');
    }
    Ok(text.trim().to_string())
}

//! Sequential chapter crawl: fetch, find the next link, save the text, repeat until no next link.

use crate::model::{base_address, CrawlReport, NovelPaths};
use crate::output::TextArtifact;
use crate::scraper::{
    extract_chapter_text, extract_next_chapter_link, parse_novel_title, PageFetcher, ScraperError,
};
use reqwest::Url;
use std::path::PathBuf;
use tracing::{info, warn};

/// Options for a crawl run.
pub struct CrawlOptions<'a> {
    /// Directory receiving `<stem>.txt`.
    pub output_dir: PathBuf,
    /// Stop after this many chapters even if a next link exists.
    pub max_chapters: Option<u32>,
    /// Called once with the novel title, right after the first page is parsed.
    pub on_title: Option<&'a dyn Fn(&str)>,
    /// Called after each chapter is saved with its 1-based number and address.
    pub progress: Option<&'a dyn Fn(u32, &Url)>,
}

impl Default for CrawlOptions<'_> {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            max_chapters: None,
            on_title: None,
            progress: None,
        }
    }
}

/// Crawl from `start` until a page has no next-chapter link, appending every chapter's text.
///
/// The first page supplies the novel title, which names the text artifact; a missing title
/// aborts before anything is written. Relative links on every page resolve against the
/// directory of `start`. Pages without readable paragraphs still get an (empty) entry and are
/// counted in [CrawlReport::empty_chapters]. Any fetch error aborts the crawl and leaves the
/// chapters written so far on disk.
pub fn crawl_novel<F: PageFetcher + ?Sized>(
    fetcher: &mut F,
    start: &Url,
    options: &CrawlOptions<'_>,
) -> Result<CrawlReport, ScraperError> {
    let mut html = fetcher.fetch(start)?;
    let title = parse_novel_title(&html)?.ok_or_else(|| ScraperError::MissingTitle {
        url: start.to_string(),
    })?;
    info!(%title, "novel name");
    if let Some(f) = options.on_title {
        f(&title);
    }

    let paths = NovelPaths::new(&options.output_dir, &title);
    let base = base_address(start);
    let mut artifact = TextArtifact::create_fresh(paths.text.clone())?;

    let mut current = start.clone();
    let mut chapters = 0u32;
    let mut empty_chapters = 0u32;
    loop {
        let next = extract_next_chapter_link(&html, &base)?;
        match &next {
            Some(url) => info!(%url, "next chapter link"),
            None => info!("last chapter reached"),
        }

        let text = extract_chapter_text(&html)?;
        if text.is_empty() {
            empty_chapters += 1;
            warn!(url = %current, "chapter has no readable content");
        }
        artifact.append_chapter(&text)?;
        chapters += 1;
        if let Some(p) = options.progress {
            p(chapters, &current);
        }

        let Some(next) = next else {
            break;
        };
        if options.max_chapters.is_some_and(|max| chapters >= max) {
            info!(chapters, "chapter limit reached");
            break;
        }
        html = fetcher.fetch(&next)?;
        current = next;
    }

    Ok(CrawlReport {
        title,
        paths,
        chapters,
        empty_chapters,
        last_chapter_url: current,
    })
}

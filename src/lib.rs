//! chapterpull: follow "next chapter" links through a web novel, save the text, convert it to an e-book.

pub mod cli;
pub mod config;
pub mod convert;
pub mod epub;
pub mod model;
pub mod output;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use convert::{ConvertError, EbookConverter, ExternalConverter};
pub use epub::{
    write_epub_from_text, write_epub_with_chapter_count, BuiltinEpubConverter, EpubError,
};
pub use model::{CrawlReport, NovelPaths};
pub use output::{OutputError, TextArtifact};
pub use scraper::{
    crawl_novel, CrawlOptions, PageFetcher, PoliteClient, PoliteClientBuilder, ScraperError,
};

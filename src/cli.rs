//! CLI parsing and orchestration. Parses args, crawls the novel into a text file, then converts
//! it to an e-book. Maps errors to exit codes.

use crate::config::{self, Config};
use crate::convert::{converter_for, ConvertError, EbookConverter, DEFAULT_CONVERTER};
use crate::model::CrawlReport;
use crate::scraper::{
    crawl_novel, parse_start_url, CrawlOptions, PageFetcher, PoliteClient, ScraperError,
};
use clap::Parser;
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_EBOOK_FORMAT: &str = "epub";

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Convert(#[from] ConvertError),
}

impl CliRunError {
    /// Every failure class exits with status 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) | CliRunError::Scraper(_) | CliRunError::Convert(_) => 1,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "chapterpull", version)]
#[command(
    about = "Download a web novel chapter by chapter, save it as text, and convert it to an e-book"
)]
#[command(
    after_help = "Config file keys (output_dir, user_agent, request_delay_secs, timeout_secs, converter, ebook_format) are read from ./chapterpull.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// URL of the chapter to start from. Later chapters are found through each page's "next chapter" link.
    pub url: String,

    /// Directory for <Title>.txt and the e-book. Default: current directory.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Conversion program on PATH (default: ebook-convert), or "builtin" for the bundled EPUB writer.
    #[arg(long)]
    pub converter: Option<String>,

    /// E-book file extension handed to the converter (default: epub).
    #[arg(long)]
    pub format: Option<String>,

    /// Stop after this many chapters.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_chapters: Option<u32>,

    /// Only write the text file; skip e-book conversion.
    #[arg(long)]
    pub no_convert: bool,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Delay between requests in seconds (overrides config; default 0).
    #[arg(long)]
    pub delay: Option<u64>,

    /// Request timeout in seconds (overrides config; default: none).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Print verbose error chain and info-level logs.
    #[arg(long)]
    pub verbose: bool,
}

/// Settings for one download after CLI flags and config are merged.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub output_dir: PathBuf,
    pub ebook_format: String,
    pub max_chapters: Option<u32>,
    pub quiet: bool,
}

/// Accept bare extensions like `epub` or `.mobi`.
fn parse_ebook_format(s: &str) -> Result<String, CliRunError> {
    let ext = s.trim().trim_start_matches('.');
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CliRunError::InvalidInput(format!(
            "Invalid e-book format '{}'. Use a file extension such as epub, mobi, or azw3.",
            s
        )));
    }
    Ok(ext.to_ascii_lowercase())
}

fn validate_output_dir(dir: &Path) -> Result<(), CliRunError> {
    if !dir.is_dir() {
        return Err(CliRunError::InvalidInput(format!(
            "Cannot write output: {}: directory does not exist.",
            dir.display()
        )));
    }
    Ok(())
}

fn settings_from(args: &Args, config: Option<&Config>) -> Result<RunSettings, CliRunError> {
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."));
    validate_output_dir(&output_dir)?;
    let ebook_format = parse_ebook_format(
        args.format
            .as_deref()
            .or_else(|| config.and_then(|c| c.ebook_format.as_deref()))
            .unwrap_or(DEFAULT_EBOOK_FORMAT),
    )?;
    Ok(RunSettings {
        output_dir,
        ebook_format,
        max_chapters: args.max_chapters,
        quiet: args.quiet,
    })
}

fn build_client(args: &Args, config: Option<&Config>) -> Result<PoliteClient, CliRunError> {
    let delay_secs = args
        .delay
        .or_else(|| config.and_then(|c| c.request_delay_secs))
        .unwrap_or(0);
    let timeout_secs = args.timeout.or_else(|| config.and_then(|c| c.timeout_secs));
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.and_then(|c| c.user_agent.clone()));

    let mut builder = PoliteClient::builder()
        .delay_secs(delay_secs)
        .timeout_secs(timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))
}

fn progress_spinner() -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Crawl from `start` into the text artifact, then hand it to `converter` unless it is `None`.
///
/// The text artifact stays on disk when conversion fails.
pub fn download_novel(
    fetcher: &mut dyn PageFetcher,
    converter: Option<&dyn EbookConverter>,
    start: &Url,
    settings: &RunSettings,
) -> Result<(CrawlReport, Option<PathBuf>), CliRunError> {
    let spinner = if settings.quiet {
        None
    } else {
        Some(progress_spinner())
    };
    let progress_cb = |n: u32, url: &Url| {
        if let Some(pb) = &spinner {
            pb.set_message(format!("Chapter {}: {}", n, url));
        }
    };
    let title_cb = |title: &str| {
        if let Some(pb) = &spinner {
            pb.suspend(|| eprintln!("Novel name: {}", title));
        }
    };
    let options = CrawlOptions {
        output_dir: settings.output_dir.clone(),
        max_chapters: settings.max_chapters,
        on_title: Some(&title_cb),
        progress: Some(&progress_cb),
    };
    let crawled = crawl_novel(fetcher, start, &options);
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    let report = crawled?;

    if !settings.quiet {
        eprintln!(
            "Saved {} chapter(s) to {}",
            report.chapters,
            report.paths.text.display()
        );
        if report.empty_chapters > 0 {
            eprintln!(
                "Warning: {} chapter(s) had no readable content.",
                report.empty_chapters
            );
        }
    }

    let Some(converter) = converter else {
        return Ok((report, None));
    };
    let ebook = report.paths.ebook(&settings.ebook_format);
    converter.convert_chapters(&report.paths.text, &ebook, report.chapters)?;
    if !settings.quiet {
        eprintln!("Wrote {} (via {})", ebook.display(), converter.name());
    }
    Ok((report, Some(ebook)))
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let start = parse_start_url(&args.url).map_err(|e| match e {
        ScraperError::InvalidUrl { input, reason } => CliRunError::InvalidInput(format!(
            "Expected an absolute chapter URL, e.g. https://www.royalroad.com/fiction/123/slug/chapter/456/chapter-1. Invalid: '{}': {}",
            input, reason
        )),
        other => CliRunError::Scraper(other),
    })?;

    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let settings = settings_from(args, config.as_ref())?;
    let mut client = build_client(args, config.as_ref())?;

    let converter_name = args
        .converter
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.converter.clone()))
        .unwrap_or_else(|| DEFAULT_CONVERTER.to_string());
    let converter = converter_for(&converter_name, args.quiet);
    let converter = if args.no_convert {
        None
    } else {
        Some(converter.as_ref())
    };

    download_novel(&mut client, converter, &start, &settings)?;
    Ok(())
}

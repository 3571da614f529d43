//! Data derived from the first chapter: title, output paths, and the base address for links.

use reqwest::Url;
use std::path::{Path, PathBuf};

/// Extension of the intermediate text artifact.
pub const TEXT_EXTENSION: &str = "txt";

/// Output file stem: spaces become underscores. Path separators are replaced too so the
/// artifacts stay inside the output directory.
pub fn file_stem_for_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect()
}

/// Directory of the first chapter's address: everything up to and including the last `/` of
/// the path. Query and fragment are dropped.
pub fn base_address(first_chapter: &Url) -> Url {
    let mut base = first_chapter.clone();
    base.set_query(None);
    base.set_fragment(None);
    let dir_len = base.path().rfind('/').map(|i| i + 1).unwrap_or(0);
    let dir = base.path()[..dir_len].to_string();
    base.set_path(&dir);
    base
}

/// Where a run writes its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelPaths {
    pub text: PathBuf,
    pub stem: String,
    pub output_dir: PathBuf,
}

impl NovelPaths {
    pub fn new(output_dir: &Path, title: &str) -> Self {
        let stem = file_stem_for_title(title);
        Self {
            text: output_dir.join(format!("{}.{}", stem, TEXT_EXTENSION)),
            stem,
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// E-book path next to the text artifact, e.g. `Example_Novel.epub`.
    pub fn ebook(&self, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.stem, extension.trim_start_matches('.')))
    }
}

/// Outcome of a finished crawl.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub title: String,
    pub paths: NovelPaths,
    /// Chapters appended to the text artifact, including empty ones.
    pub chapters: u32,
    /// Chapters whose pages had no readable paragraphs.
    pub empty_chapters: u32,
    pub last_chapter_url: Url,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_replaces_spaces() {
        assert_eq!(file_stem_for_title("Example Novel"), "Example_Novel");
        assert_eq!(file_stem_for_title("A  B"), "A__B");
        assert_eq!(file_stem_for_title("Mother of Learning"), "Mother_of_Learning");
    }

    #[test]
    fn stem_replaces_path_separators() {
        assert_eq!(file_stem_for_title("Either/Or"), "Either_Or");
        assert_eq!(file_stem_for_title(r"Back\Slash"), "Back_Slash");
    }

    #[test]
    fn base_address_is_directory_of_first_chapter() -> Result<(), Box<dyn std::error::Error>> {
        let u = Url::parse("https://site.example/novel/chapter-1")?;
        assert_eq!(base_address(&u).as_str(), "https://site.example/novel/");
        Ok(())
    }

    #[test]
    fn base_address_drops_query_keeps_port() -> Result<(), Box<dyn std::error::Error>> {
        let u = Url::parse("http://localhost:8080/fiction/1/slug/chapter/2?x=1#top")?;
        assert_eq!(
            base_address(&u).as_str(),
            "http://localhost:8080/fiction/1/slug/chapter/"
        );
        Ok(())
    }

    #[test]
    fn base_address_of_trailing_slash_is_itself() -> Result<(), Box<dyn std::error::Error>> {
        let u = Url::parse("https://site.example/novel/chapter-1/")?;
        assert_eq!(
            base_address(&u).as_str(),
            "https://site.example/novel/chapter-1/"
        );
        Ok(())
    }

    #[test]
    fn paths_from_title() {
        let paths = NovelPaths::new(Path::new("out"), "Example Novel");
        assert_eq!(paths.text, PathBuf::from("out/Example_Novel.txt"));
        assert_eq!(paths.ebook("epub"), PathBuf::from("out/Example_Novel.epub"));
        assert_eq!(paths.ebook(".mobi"), PathBuf::from("out/Example_Novel.mobi"));
    }
}

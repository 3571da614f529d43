//! In-process EPUB 3 writer for the text artifact. Selected with `--converter builtin`.
//!
//! Each separator-delimited segment of the text becomes one chapter; each line of a segment
//! becomes one paragraph. Empty leading chapters leave no trace in the text, so when the crawl's
//! chapter count is known they are restored as empty chapters. The book title is the file stem with underscores turned back into
//! spaces.

use crate::convert::{ConvertError, EbookConverter, BUILTIN_CONVERTER};
use crate::output::CHAPTER_SEPARATOR;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTAINER_XML: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n  <rootfiles>\n    <rootfile full-path=\"OEBPS/content.opf\" media-type=\"application/oebps-package+xml\"/>\n  </rootfiles>\n</container>";
const MIMETYPE: &[u8] = b"application/epub+zip";
const OEBPS_PREFIX: &str = "OEBPS/";

#[derive(Debug, Error)]
pub enum EpubError {
    #[error("Cannot write EPUB: title derived from {path} is empty.")]
    EmptyTitle { path: PathBuf },

    #[error("Cannot read text for EPUB: {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create EPUB file: {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write EPUB archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl From<std::io::Error> for EpubError {
    fn from(e: std::io::Error) -> Self {
        EpubError::Zip(zip::result::ZipError::Io(e))
    }
}

/// Chapters recovered from the text artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TextBook {
    title: String,
    chapters: Vec<Vec<String>>,
}

/// [EbookConverter] backed by [write_epub_from_text].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEpubConverter;

impl EbookConverter for BuiltinEpubConverter {
    fn name(&self) -> &str {
        BUILTIN_CONVERTER
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        info!(input = %input.display(), output = %output.display(), "writing EPUB");
        write_epub_from_text(input, output)?;
        Ok(())
    }

    fn convert_chapters(
        &self,
        input: &Path,
        output: &Path,
        chapters: u32,
    ) -> Result<(), ConvertError> {
        info!(input = %input.display(), output = %output.display(), chapters, "writing EPUB");
        write_epub_with_chapter_count(input, output, chapters)?;
        Ok(())
    }
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn split_chapters(text: &str) -> Vec<Vec<String>> {
    text.split(CHAPTER_SEPARATOR)
        .map(|segment| {
            segment
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()
        })
        .collect()
}

/// Split `text` into `expected` chapters. Missing segments can only be empty chapters written
/// before any content, so they are put back at the front.
fn split_chapters_expecting(text: &str, expected: usize) -> Vec<Vec<String>> {
    let found = split_chapters(text);
    if found.len() > expected {
        warn!(found = found.len(), expected, "text holds more chapters than were crawled");
        return found;
    }
    let mut chapters = vec![Vec::new(); expected - found.len()];
    chapters.extend(found);
    chapters
}

/// Read the text artifact at `input` and write an EPUB 3 archive to `output`.
pub fn write_epub_from_text(input: &Path, output: &Path) -> Result<(), EpubError> {
    write_epub(input, output, None)
}

/// As [write_epub_from_text], for an artifact known to hold `chapters` chapters.
pub fn write_epub_with_chapter_count(
    input: &Path,
    output: &Path,
    chapters: u32,
) -> Result<(), EpubError> {
    write_epub(input, output, Some(chapters as usize))
}

fn write_epub(input: &Path, output: &Path, expected: Option<usize>) -> Result<(), EpubError> {
    let text = std::fs::read_to_string(input).map_err(|e| EpubError::ReadInput {
        path: input.to_path_buf(),
        source: e,
    })?;
    let title = title_from_path(input);
    if title.is_empty() {
        return Err(EpubError::EmptyTitle {
            path: input.to_path_buf(),
        });
    }
    let book = TextBook {
        title,
        chapters: match expected {
            Some(n) => split_chapters_expecting(&text, n),
            None => split_chapters(&text),
        },
    };

    let file = std::fs::File::create(output).map_err(|e| EpubError::CreateFile {
        path: output.to_path_buf(),
        source: e,
    })?;
    let mut zip = ZipWriter::new(file);
    let options_stored = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);
    let options_deflate = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    // Mimetype first, uncompressed.
    zip.start_file("mimetype", options_stored)?;
    zip.write_all(MIMETYPE)?;
    zip.start_file("META-INF/container.xml", options_deflate)?;
    zip.write_all(CONTAINER_XML)?;

    write_opf(&book, &mut zip, options_deflate)?;
    write_nav_xhtml(&book, &mut zip, options_deflate)?;
    write_chapters(&book, &mut zip, options_deflate)?;

    zip.finish()?;
    Ok(())
}

fn chapter_title(index: usize) -> String {
    format!("Chapter {}", index + 1)
}

fn write_opf(
    book: &TextBook,
    zip: &mut ZipWriter<impl Write + Seek>,
    options: SimpleFileOptions,
) -> Result<(), EpubError> {
    let id = xml_escape(&format!("urn:chapterpull:{}", book.title.replace(' ', "_")));
    let title = xml_escape(&book.title);

    let mut manifest = String::from(
        r#"    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
"#,
    );
    let mut spine = String::new();
    for i in 1..=book.chapters.len() {
        manifest.push_str(&format!(
            r#"    <item id="chapter-{i}" href="chapter-{i}.xhtml" media-type="application/xhtml+xml"/>
"#
        ));
        spine.push_str(&format!("    <itemref idref=\"chapter-{i}\"/>\n"));
    }

    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="book-id" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="book-id">{id}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine>
{spine}  </spine>
</package>
"#
    );
    zip.start_file(format!("{}content.opf", OEBPS_PREFIX), options)?;
    zip.write_all(opf.as_bytes())?;
    Ok(())
}

fn write_nav_xhtml(
    book: &TextBook,
    zip: &mut ZipWriter<impl Write + Seek>,
    options: SimpleFileOptions,
) -> Result<(), EpubError> {
    let mut nav_links = String::new();
    for i in 0..book.chapters.len() {
        nav_links.push_str(&format!(
            "      <li><a href=\"chapter-{}.xhtml\">{}</a></li>\n",
            i + 1,
            chapter_title(i)
        ));
    }
    let nav = format!(
        r#"<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
  <meta charset="UTF-8"/>
  <title>{}</title>
</head>
<body>
  <nav epub:type="toc">
    <h1>Contents</h1>
    <ol>
{}    </ol>
  </nav>
</body>
</html>
"#,
        xml_escape(&book.title),
        nav_links
    );
    zip.start_file(format!("{}nav.xhtml", OEBPS_PREFIX), options)?;
    zip.write_all(nav.as_bytes())?;
    Ok(())
}

fn write_chapters(
    book: &TextBook,
    zip: &mut ZipWriter<impl Write + Seek>,
    options: SimpleFileOptions,
) -> Result<(), EpubError> {
    for (i, paragraphs) in book.chapters.iter().enumerate() {
        let title = chapter_title(i);
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<p>{}</p>\n", xml_escape(p)))
            .collect();
        let html = format!(
            r#"<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <meta charset="UTF-8"/>
  <title>{title}</title>
</head>
<body>
<h2>{title}</h2>
{body}</body>
</html>
"#
        );
        zip.start_file(format!("{}chapter-{}.xhtml", OEBPS_PREFIX, i + 1), options)?;
        zip.write_all(html.as_bytes())?;
    }
    Ok(())
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

//! Output text artifact: one UTF-8 file, chapters appended in reading order.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Written between consecutive chapters, never before the first or after the last.
pub const CHAPTER_SEPARATOR: &str = "\n\n\n";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only handle to the text artifact.
#[derive(Debug)]
pub struct TextArtifact {
    path: PathBuf,
}

impl TextArtifact {
    /// Delete any file left at `path` by an earlier run. The file itself is created by the
    /// first [append_chapter](Self::append_chapter).
    pub fn create_fresh(path: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let path = path.into();
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(OutputError::Io { path, source: e }),
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one chapter. The separator goes first only if the file already has content.
    ///
    /// Blank-line runs inside `text` are cut to a single blank line and outer newlines are
    /// dropped, so the separator only ever marks a chapter boundary.
    pub fn append_chapter(&mut self, text: &str) -> Result<(), OutputError> {
        let text = fold_blank_lines(text);
        let io_err = |e: std::io::Error| OutputError::Io {
            path: self.path.clone(),
            source: e,
        };
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        let len = f.metadata().map_err(io_err)?.len();
        if len != 0 {
            f.write_all(CHAPTER_SEPARATOR.as_bytes()).map_err(io_err)?;
        }
        f.write_all(text.as_bytes()).map_err(io_err)?;
        Ok(())
    }
}

fn fold_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.trim_matches('\n').chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(c);
    }
    out
}

//! E-book export. The text artifact is handed to a converter; the default shells out to
//! Calibre's `ebook-convert`.

use crate::epub::BuiltinEpubConverter;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::info;

/// Default external conversion program.
pub const DEFAULT_CONVERTER: &str = "ebook-convert";
/// Converter name that selects the in-process EPUB writer.
pub const BUILTIN_CONVERTER: &str = "builtin";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("'{tool}' command not found or could not be run: {source}. Make sure Calibre is installed and in your PATH.")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{tool}' failed with {status}")]
    ConversionFailed { tool: String, status: ExitStatus },

    #[error("{0}")]
    Builtin(#[from] crate::epub::EpubError),
}

/// Turns the text artifact at `input` into an e-book at `output`.
pub trait EbookConverter {
    /// Name shown in messages (program name or `builtin`).
    fn name(&self) -> &str;
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Convert a text artifact the crawl wrote `chapters` chapters into.
    fn convert_chapters(
        &self,
        input: &Path,
        output: &Path,
        _chapters: u32,
    ) -> Result<(), ConvertError> {
        self.convert(input, output)
    }
}

/// Runs `<program> <input> <output>` and waits for it.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: String,
    quiet: bool,
}

impl ExternalConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            quiet: false,
        }
    }

    /// Discard the program's stdout (its stderr is always shown).
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl EbookConverter for ExternalConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        info!(tool = %self.program, input = %input.display(), output = %output.display(), "converting");
        let stdout = if self.quiet {
            Stdio::null()
        } else {
            Stdio::inherit()
        };
        let status = Command::new(&self.program)
            .arg(input)
            .arg(output)
            .stdout(stdout)
            .status()
            .map_err(|e| ConvertError::ToolUnavailable {
                tool: self.program.clone(),
                source: e,
            })?;
        if !status.success() {
            return Err(ConvertError::ConversionFailed {
                tool: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

/// Pick a converter by name: `builtin` or an external program.
pub fn converter_for(name: &str, quiet: bool) -> Box<dyn EbookConverter> {
    if name.eq_ignore_ascii_case(BUILTIN_CONVERTER) {
        Box::new(BuiltinEpubConverter)
    } else {
        Box::new(ExternalConverter::new(name).quiet(quiet))
    }
}

//! Optional config file loading. Search order: ./chapterpull.toml, then
//! $XDG_CONFIG_HOME/chapterpull/config.toml (or ~/.config/chapterpull/config.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct Config {
    /// Directory for the .txt and e-book outputs when -o is not set. Relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Delay in seconds between requests.
    pub request_delay_secs: Option<u64>,
    /// Request timeout in seconds. Unset means wait indefinitely.
    pub timeout_secs: Option<u64>,
    /// Conversion program on PATH, or "builtin".
    pub converter: Option<String>,
    /// E-book extension passed to the converter, e.g. "epub" or "mobi".
    pub ebook_format: Option<String>,
}

/// Search order: (1) ./chapterpull.toml, (2) $XDG_CONFIG_HOME/chapterpull/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("chapterpull.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("chapterpull").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            return load_config_file(path).map(Some);
        }
    }
    Ok(None)
}

fn load_config_file(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert!(c.output_dir.is_none());
        assert!(c.user_agent.is_none());
        assert!(c.request_delay_secs.is_none());
        assert!(c.timeout_secs.is_none());
        assert!(c.converter.is_none());
        assert!(c.ebook_format.is_none());
    }

    #[test]
    fn parse_full_config() {
        let s = r#"
            output_dir = "out"
            user_agent = "Custom/1.0"
            request_delay_secs = 3
            timeout_secs = 60
            converter = "builtin"
            ebook_format = "mobi"
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert_eq!(c.output_dir.as_deref(), Some(Path::new("out")));
        assert_eq!(c.user_agent.as_deref(), Some("Custom/1.0"));
        assert_eq!(c.request_delay_secs, Some(3));
        assert_eq!(c.timeout_secs, Some(60));
        assert_eq!(c.converter.as_deref(), Some("builtin"));
        assert_eq!(c.ebook_format.as_deref(), Some("mobi"));
    }

    #[test]
    fn parse_partial_config() {
        let c: Config = toml::from_str("request_delay_secs = 1").unwrap();
        assert_eq!(c.request_delay_secs, Some(1));
        assert!(c.converter.is_none());
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("output_dir = [").is_err());
    }

    #[test]
    fn unknown_key_errors() {
        assert!(toml::from_str::<Config>("retry_count = 3").is_err());
    }

    #[test]
    fn load_config_file_reports_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("chapterpull.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"")?;
        let err = load_config_file(&path).err().ok_or("expected an error")?;
        assert!(err.contains("chapterpull.toml"));
        std::fs::write(&path, "converter = \"ebook-convert\"")?;
        let c = load_config_file(&path)?;
        assert_eq!(c.converter.as_deref(), Some("ebook-convert"));
        Ok(())
    }
}

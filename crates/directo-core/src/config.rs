//! TOML configuration
//!
//! Every key is optional. A missing file yields the defaults, which describe
//! the roster at `Sheet1!A:D` and the directory at `working!E:AD`, both with a
//! header in row 1 and data from row 2 to the last populated row.

use crate::dispatch::{BatchDispatcher, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};
use crate::error::{Error, Result};
use crate::sheet::SheetLayout;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "directo.toml";
pub const ROSTER_SHEET_ID_ENV: &str = "ROSTER_SHEET_ID";
pub const DIRECTORY_SHEET_ID_ENV: &str = "DIRECTORY_SHEET_ID";
pub const DEFAULT_TOKEN_ENV: &str = "DIRECTO_ACCESS_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub roster: SheetSource,
    pub directory: SheetSource,
    pub document: DocumentSettings,
    pub google: GoogleSettings,
}

/// One sheet to read; unset layout keys fall back per sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSource {
    /// Spreadsheet id, or a CSV path when reading exports
    pub sheet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_row_start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_row_end: Option<u32>,
}

impl SheetSource {
    /// Resolve the layout, filling unset keys from `defaults`
    pub fn layout(&self, defaults: SheetLayout) -> SheetLayout {
        SheetLayout {
            tab: self.tab.clone().unwrap_or(defaults.tab),
            col_start: self.col_start.clone().unwrap_or(defaults.col_start),
            col_end: self.col_end.clone().unwrap_or(defaults.col_end),
            header_row: self.header_row.unwrap_or(defaults.header_row),
            data_row_start: self.data_row_start.unwrap_or(defaults.data_row_start),
            data_row_end: self.data_row_end.or(defaults.data_row_end),
        }
    }
}

fn default_layout(tab: &str, col_start: &str, col_end: &str) -> SheetLayout {
    SheetLayout {
        tab: tab.to_string(),
        col_start: col_start.to_string(),
        col_end: col_end.to_string(),
        header_row: 1,
        data_row_start: 2,
        data_row_end: None,
    }
}

pub fn default_roster_layout() -> SheetLayout {
    default_layout("Sheet1", "A", "D")
}

pub fn default_directory_layout() -> SheetLayout {
    default_layout("working", "E", "AD")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: DEFAULT_BATCH_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// Environment variable holding the OAuth bearer token
    pub access_token_env: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            access_token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

impl Config {
    /// Load from `config_path`, or the defaults when the file does not exist
    ///
    /// Sheet ids from the environment take precedence over the file.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config = Self::read_file(config_path.as_ref())?.unwrap_or_default();
        config.apply_env();
        Ok(config)
    }

    fn read_file(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| Error::FileRead {
            path: config_path.to_path_buf(),
            source,
        })?;

        let config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: config_path.to_path_buf(),
            source,
        })?;

        Ok(Some(config))
    }

    fn apply_env(&mut self) {
        if let Ok(id) = env::var(ROSTER_SHEET_ID_ENV) {
            self.roster.sheet_id = id;
        }
        if let Ok(id) = env::var(DIRECTORY_SHEET_ID_ENV) {
            self.directory.sheet_id = id;
        }
    }

    pub fn roster_layout(&self) -> SheetLayout {
        self.roster.layout(default_roster_layout())
    }

    pub fn directory_layout(&self) -> SheetLayout {
        self.directory.layout(default_directory_layout())
    }

    pub fn dispatcher(&self) -> BatchDispatcher {
        BatchDispatcher::new(
            self.document.batch_size,
            Duration::from_millis(self.document.batch_delay_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.roster_layout().data_range().to_string(), "Sheet1!A2:D");
        assert_eq!(config.directory_layout().header_range().to_string(), "working!E1:AD1");
        assert_eq!(config.dispatcher(), BatchDispatcher::default());
        assert_eq!(config.google.access_token_env, "DIRECTO_ACCESS_TOKEN");
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nonexistent.toml");

        let config = Config::read_file(&missing).unwrap();

        assert!(config.is_none());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("directo.toml");
        std::fs::write(
            &config_file,
            r#"
[roster]
sheet_id = "roster-id"
tab = "Fall"

[directory]
data_row_end = 40

[document]
batch_delay_ms = 0
"#,
        )
        .unwrap();

        let config = Config::read_file(&config_file).unwrap().unwrap();

        assert_eq!(config.roster.sheet_id, "roster-id");
        assert_eq!(config.roster_layout().data_range().to_string(), "Fall!A2:D");
        assert_eq!(
            config.directory_layout().data_range().to_string(),
            "working!E2:AD40"
        );
        assert_eq!(config.document.batch_size, 100);
        assert_eq!(config.dispatcher().delay(), Duration::ZERO);
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("bad.toml");
        std::fs::write(&config_file, "[document]\nbatch_size = \"lots\"\n").unwrap();

        let err = Config::read_file(&config_file).unwrap_err();

        match err {
            Error::ConfigParse { path, .. } => assert_eq!(path, config_file),
            other => panic!("unexpected error: {other}"),
        }
    }
}

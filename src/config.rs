//! Configuration for both pipeline steps.
//!
//! Values come from an optional config file (TOML, YAML or JSON by
//! extension). Command-line flags override them. Relative paths in a config
//! file are resolved against the file's directory.

use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convert::{ConvertOptions, SqlOptions, DEFAULT_TABLE_NAME};
use crate::extract::{ExtractOptions, DEFAULT_BAND_HEIGHT, DEFAULT_LINE_THRESHOLD};
use crate::ocr::OcrConfig;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "admissions-ocr.toml";

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the image-to-text step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Source image.
    pub image: PathBuf,
    /// Text file receiving one line per visual row.
    pub output: PathBuf,
    /// Band height in pixels.
    pub band_height: u32,
    /// Vertical tolerance for grouping hits into one line, in pixels.
    pub line_threshold: f32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            image: PathBuf::from("image.png"),
            output: PathBuf::from("raw.txt"),
            band_height: DEFAULT_BAND_HEIGHT,
            line_threshold: DEFAULT_LINE_THRESHOLD,
        }
    }
}

impl ExtractConfig {
    /// Validated pipeline options.
    pub fn options(&self) -> Result<ExtractOptions, ConfigError> {
        let band_height = NonZeroU32::new(self.band_height)
            .ok_or_else(|| ConfigError::Invalid("band_height must be greater than 0".to_string()))?;
        if !self.line_threshold.is_finite() || self.line_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "line_threshold must be a non-negative number, got {}",
                self.line_threshold
            )));
        }
        Ok(ExtractOptions {
            band_height,
            line_threshold: self.line_threshold,
        })
    }
}

/// Settings for the text-to-SQL step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Text file produced by the extract step.
    pub input: PathBuf,
    /// SQL script to write.
    pub output: PathBuf,
    /// Target table name.
    pub table_name: String,
    /// Render string fields whose key was missing as NULL instead of ''.
    pub null_missing_strings: bool,
    /// Drop records in which no line parsed as `key: value`.
    pub skip_empty_records: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("raw.txt"),
            output: PathBuf::from("raw.sql"),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            null_missing_strings: false,
            skip_empty_records: false,
        }
    }
}

impl ConvertConfig {
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            sql: SqlOptions {
                table_name: self.table_name.clone(),
                null_missing_strings: self.null_missing_strings,
            },
            skip_empty_records: self.skip_empty_records,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub convert: ConvertConfig,
    pub ocr: OcrConfig,
    /// File this config was loaded from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load from an explicit path, else from [`DEFAULT_CONFIG_FILE`] if present,
    /// else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            return Self::load_from_path(default_path);
        }
        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    /// Supports TOML, YAML and JSON based on file extension.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let mut config: Config = match ext {
            "json" => serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?
            }
            _ => toml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?,
        };

        if let Some(base_dir) = path.parent() {
            config.resolve_paths(base_dir);
        }
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve relative paths against `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base_dir.join(&*p);
            }
        };
        resolve(&mut self.extract.image);
        resolve(&mut self.extract.output);
        resolve(&mut self.convert.input);
        resolve(&mut self.convert.output);
        if let Some(model_path) = self.ocr.model_path.as_mut() {
            resolve(model_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrBackendType;

    #[test]
    fn test_defaults_match_fixed_file_names() {
        let config = Config::default();
        assert_eq!(config.extract.image, PathBuf::from("image.png"));
        assert_eq!(config.extract.output, PathBuf::from("raw.txt"));
        assert_eq!(config.convert.input, PathBuf::from("raw.txt"));
        assert_eq!(config.convert.output, PathBuf::from("raw.sql"));
        assert_eq!(config.convert.table_name, "university_admissions");
        assert_eq!(config.ocr.backend, OcrBackendType::Tesseract);
    }

    #[test]
    fn test_partial_toml_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("admissions-ocr.toml");
        fs::write(
            &path,
            "[extract]\nimage = \"shots/list.png\"\nband_height = 1500\n\n\
             [ocr]\nbackend = \"paddleocr\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.extract.image, dir.path().join("shots/list.png"));
        assert_eq!(config.extract.output, dir.path().join("raw.txt"));
        assert_eq!(config.extract.band_height, 1500);
        assert_eq!(config.extract.line_threshold, 20.0);
        assert_eq!(config.ocr.backend, OcrBackendType::PaddleOcr);
        assert_eq!(config.source_path, Some(path));
    }

    #[test]
    fn test_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("config.json");
        fs::write(&json, r#"{"convert": {"table_name": "admissions_2024"}}"#).unwrap();
        assert_eq!(
            Config::load_from_path(&json).unwrap().convert.table_name,
            "admissions_2024"
        );

        let yaml = dir.path().join("config.yaml");
        fs::write(&yaml, "convert:\n  null_missing_strings: true\n").unwrap();
        assert!(Config::load_from_path(&yaml).unwrap().convert.null_missing_strings);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[extract\n").unwrap();
        match Config::load_from_path(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_options_validation() {
        let mut extract = ExtractConfig::default();
        assert_eq!(extract.options().unwrap().band_height.get(), 2000);

        extract.band_height = 0;
        assert!(matches!(extract.options(), Err(ConfigError::Invalid(_))));

        extract.band_height = 100;
        extract.line_threshold = -1.0;
        assert!(matches!(extract.options(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}

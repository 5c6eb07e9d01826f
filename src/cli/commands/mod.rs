//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod convert;
mod extract;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::ocr::OcrBackendType;

#[derive(Parser)]
#[command(name = "admissions-ocr")]
#[command(about = "OCR admission listing screenshots and convert the records to SQL")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./admissions-ocr.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// OCR and line-grouping overrides shared by `extract` and `run`.
#[derive(Args, Debug, Default)]
struct OcrArgs {
    /// OCR backend (tesseract, paddleocr)
    #[arg(short, long)]
    backend: Option<OcrBackendType>,
    /// OCR language (e.g. chi_sim, eng)
    #[arg(short, long)]
    language: Option<String>,
    /// Directory holding OCR model files
    #[arg(long)]
    model_path: Option<PathBuf>,
    /// Band height in pixels
    #[arg(long)]
    band_height: Option<u32>,
    /// Vertical tolerance for grouping hits into a line, in pixels
    #[arg(long)]
    line_threshold: Option<f32>,
}

impl OcrArgs {
    fn apply(self, config: &mut Config) {
        if let Some(backend) = self.backend {
            config.ocr.backend = backend;
        }
        if let Some(language) = self.language {
            config.ocr.language = language;
        }
        if let Some(model_path) = self.model_path {
            config.ocr.model_path = Some(model_path);
        }
        if let Some(band_height) = self.band_height {
            config.extract.band_height = band_height;
        }
        if let Some(line_threshold) = self.line_threshold {
            config.extract.line_threshold = line_threshold;
        }
    }
}

/// SQL rendering overrides shared by `convert` and `run`.
#[derive(Args, Debug, Default)]
struct SqlArgs {
    /// Target table name
    #[arg(short, long)]
    table: Option<String>,
    /// Render string fields missing from a record as NULL instead of ''
    #[arg(long)]
    null_missing_strings: bool,
    /// Drop records in which no line parsed as "key: value"
    #[arg(long)]
    skip_empty_records: bool,
}

impl SqlArgs {
    fn apply(self, config: &mut Config) {
        if let Some(table) = self.table {
            config.convert.table_name = table;
        }
        if self.null_missing_strings {
            config.convert.null_missing_strings = true;
        }
        if self.skip_empty_records {
            config.convert.skip_empty_records = true;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// OCR an image band by band and write one line of text per visual row
    Extract {
        /// Image to OCR (default: image.png)
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Text file to write (default: raw.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// Convert extracted "key: value" records into SQL
    Convert {
        /// Text file to read (default: raw.txt)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// SQL file to write (default: raw.sql)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        sql: SqlArgs,
    },

    /// Run extract and then convert using the configured paths
    Run {
        #[command(flatten)]
        ocr: OcrArgs,
        #[command(flatten)]
        sql: SqlArgs,
    },

    /// Check which OCR backends are available
    OcrCheck,
}

/// Parse arguments and run the selected command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Extract { image, output, ocr } => {
            if let Some(image) = image {
                config.extract.image = image;
            }
            if let Some(output) = output {
                config.extract.output = output;
            }
            ocr.apply(&mut config);
            extract::cmd_extract(&config)
        }
        Commands::Convert { input, output, sql } => {
            if let Some(input) = input {
                config.convert.input = input;
            }
            if let Some(output) = output {
                config.convert.output = output;
            }
            sql.apply(&mut config);
            convert::cmd_convert(&config)
        }
        Commands::Run { ocr, sql } => {
            ocr.apply(&mut config);
            sql.apply(&mut config);
            if config.extract.output != config.convert.input {
                tracing::warn!(
                    "extract output {} differs from convert input {}",
                    config.extract.output.display(),
                    config.convert.input.display()
                );
            }
            extract::cmd_extract(&config)?;
            convert::cmd_convert(&config)
        }
        Commands::OcrCheck => check::cmd_ocr_check(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_flags_override_config() {
        let cli = Cli::try_parse_from([
            "admissions-ocr",
            "extract",
            "--image",
            "list.png",
            "--backend",
            "paddle",
            "--band-height",
            "1000",
        ])
        .unwrap();
        let Commands::Extract { image, ocr, .. } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(image, Some(PathBuf::from("list.png")));

        let mut config = Config::default();
        ocr.apply(&mut config);
        assert_eq!(config.ocr.backend, OcrBackendType::PaddleOcr);
        assert_eq!(config.extract.band_height, 1000);
        assert_eq!(config.ocr.language, "chi_sim");
    }

    #[test]
    fn test_convert_flags_override_config() {
        let cli = Cli::try_parse_from([
            "admissions-ocr",
            "-v",
            "convert",
            "--table",
            "admissions_2024",
            "--null-missing-strings",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Convert { sql, input, .. } = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(input, None);

        let mut config = Config::default();
        sql.apply(&mut config);
        assert_eq!(config.convert.table_name, "admissions_2024");
        assert!(config.convert.null_missing_strings);
        assert!(!config.convert.skip_empty_records);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["admissions-ocr", "extract", "--backend", "easyocr"]).is_err());
    }
}

//! Conversion of extracted `key: value` text into admissions SQL.
//!
//! Parsing is permissive: lines without a separator are dropped, missing keys
//! fall back to defaults and bad numbers become `NULL`. Only I/O and invalid
//! options are errors.

mod admission;
mod records;
mod sql;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use admission::{digits_only, first_number, keys, AdmissionRecord};
pub use records::{parse_line, parse_record, parse_records, RawRecord};
pub use sql::{
    create_table_sql, generate_sql, insert_sql, is_valid_identifier, row_values, sql_escape,
    SqlOptions, DEFAULT_TABLE_NAME,
};

/// Errors from the converter.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Invalid table name {0:?} (expected letters, digits and underscores)")]
    InvalidTableName(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Converter options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub sql: SqlOptions,
    /// Drop records in which no line parsed as `key: value`.
    pub skip_empty_records: bool,
}

/// Outcome of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Generated SQL script.
    pub sql: String,
    /// Number of rows in the INSERT statement.
    pub rows: usize,
    /// Number of empty records dropped.
    pub skipped: usize,
}

/// Convert extracted text into SQL.
pub fn convert_text(text: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    if !is_valid_identifier(&options.sql.table_name) {
        return Err(ConvertError::InvalidTableName(options.sql.table_name.clone()));
    }

    let raw_records = parse_records(text);
    let total = raw_records.len();
    let records: Vec<AdmissionRecord> = raw_records
        .iter()
        .filter(|raw| !(options.skip_empty_records && raw.is_empty()))
        .map(AdmissionRecord::from_raw)
        .collect();
    let skipped = total - records.len();

    tracing::info!("Parsed {} record(s), skipped {}", total, skipped);
    if records.is_empty() {
        tracing::warn!("No records found; emitting table definition only");
    }

    Ok(Conversion {
        sql: generate_sql(&records, &options.sql),
        rows: records.len(),
        skipped,
    })
}

/// Read `input`, convert it, and write the SQL to `output` (replacing it).
pub fn convert_file(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    let text = fs::read_to_string(input).map_err(|source| ConvertError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let conversion = convert_text(&text, options)?;
    fs::write(output, &conversion.sql).map_err(|source| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(conversion)
}

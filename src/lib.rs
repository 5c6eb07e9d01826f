//! admissions-ocr: turn long screenshots of admission listings into SQL.
//!
//! Two independent steps:
//! - [`extract`]: slice an image into bands, OCR each band and reassemble the
//!   hits into lines of text.
//! - [`convert`]: parse the blank-line-delimited `key: value` records in that
//!   text and emit `CREATE TABLE` / `INSERT` statements.

pub mod cli;
pub mod config;
pub mod convert;
pub mod extract;
pub mod ocr;

//! Blank-line-delimited `key: value` record parsing.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// One or more blank lines (whitespace-only lines count as blank).
static RECORD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("record separator pattern should compile"));

/// Key up to the first full-width or half-width colon, value is the rest.
static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(.+?)[：:]\s*(.*)$").expect("key/value pattern should compile"));

/// Raw fields of one record. Later lines overwrite earlier ones with the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse a single `key: value` line. Returns `None` when the line has no colon.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let caps = KEY_VALUE.captures(line)?;
    let key = caps.get(1)?.as_str().trim();
    let value = caps.get(2).map_or("", |m| m.as_str()).trim();
    Some((key, value))
}

/// Parse one record block; lines that do not match are skipped.
pub fn parse_record(block: &str) -> RawRecord {
    let mut record = RawRecord::default();
    for line in block.trim().lines() {
        match parse_line(line) {
            Some((key, value)) => record.insert(key, value),
            None => tracing::trace!("Skipping line without key/value separator: {:?}", line),
        }
    }
    record
}

/// Split text into records on blank lines and parse each one.
///
/// Whitespace-only input yields no records rather than one record with every
/// field defaulted, so an empty capture produces no `INSERT` at all.
pub fn parse_records(text: &str) -> Vec<RawRecord> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    RECORD_SEPARATOR.split(text).map(parse_record).collect()
}

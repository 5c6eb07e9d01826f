//! SQL text generation for admissions rows.
//!
//! Output targets MySQL: one `DROP`/`CREATE TABLE` block followed by a single
//! multi-row `INSERT`. Nothing here talks to a database.

use std::fmt::Write as _;

use super::admission::{keys, AdmissionRecord};

/// Default target table.
pub const DEFAULT_TABLE_NAME: &str = "university_admissions";

/// Data columns in insert order, with MySQL type and source-language comment.
const COLUMNS: [(&str, &str, &str); 8] = [
    ("year", "INT", keys::YEAR),
    ("undergraduate_major", "VARCHAR(100)", keys::UNDERGRADUATE_MAJOR),
    ("institution_name", "VARCHAR(200)", keys::INSTITUTION_NAME),
    ("joint_training_school", "VARCHAR(200)", keys::JOINT_TRAINING_SCHOOL),
    ("enrollment", "INT", keys::ENROLLMENT),
    ("exam_subjects", "TEXT", keys::EXAM_SUBJECTS),
    ("tuition", "INT", keys::TUITION),
    ("lowest_score", "INT", keys::LOWEST_SCORE),
];

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOptions {
    /// Target table name; must be a plain identifier.
    pub table_name: String,
    /// Render string fields whose key was missing as `NULL` instead of `''`.
    pub null_missing_strings: bool,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            null_missing_strings: false,
        }
    }
}

/// Check that a table name is a bare SQL identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape a value for use inside a single-quoted SQL literal.
pub fn sql_escape(s: &str) -> String {
    s.replace('\'', "''")
}

fn int_literal(value: Option<i64>) -> String {
    match value {
        Some(n) => n.to_string(),
        None => "NULL".to_string(),
    }
}

fn string_literal(value: Option<&str>, null_missing: bool) -> String {
    match value {
        Some(s) if !s.is_empty() => format!("'{}'", sql_escape(s)),
        None if null_missing => "NULL".to_string(),
        _ => "''".to_string(),
    }
}

/// `DROP TABLE` and `CREATE TABLE` statements, separated by a blank line.
pub fn create_table_sql(table_name: &str) -> String {
    let mut sql = format!("DROP TABLE IF EXISTS {};\n\n", table_name);
    writeln!(sql, "CREATE TABLE {} (", table_name).ok();
    sql.push_str("  id INT AUTO_INCREMENT PRIMARY KEY");
    for (name, sql_type, comment) in COLUMNS {
        write!(
            sql,
            ",\n  {} {} COMMENT '{}'",
            name,
            sql_type,
            sql_escape(comment)
        )
        .ok();
    }
    sql.push_str("\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;");
    sql
}

/// The value tuple for one record, e.g. `(2020, '计算机', ..., NULL)`.
pub fn row_values(record: &AdmissionRecord, options: &SqlOptions) -> String {
    let text = |value: &Option<String>| string_literal(value.as_deref(), options.null_missing_strings);
    let values = [
        int_literal(record.year),
        text(&record.undergraduate_major),
        text(&record.institution_name),
        text(&record.joint_training_school),
        int_literal(record.enrollment),
        text(&record.exam_subjects),
        int_literal(record.tuition),
        int_literal(record.lowest_score),
    ];
    format!("({})", values.join(", "))
}

/// One multi-row `INSERT` for all records, or `None` when there are no records.
pub fn insert_sql(records: &[AdmissionRecord], options: &SqlOptions) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    let columns: Vec<&str> = COLUMNS.iter().map(|(name, _, _)| *name).collect();
    let rows: Vec<String> = records
        .iter()
        .map(|record| row_values(record, options))
        .collect();
    Some(format!(
        "INSERT INTO {} ({}) VALUES\n{};",
        options.table_name,
        columns.join(", "),
        rows.join(",\n")
    ))
}

/// Full script: DDL block, blank line, INSERT block.
pub fn generate_sql(records: &[AdmissionRecord], options: &SqlOptions) -> String {
    let mut statements = vec![create_table_sql(&options.table_name)];
    statements.extend(insert_sql(records, options));
    statements.join("\n\n")
}

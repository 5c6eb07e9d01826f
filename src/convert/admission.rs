//! Coercion of raw records into the admissions row schema.

use std::sync::LazyLock;

use regex::Regex;

use super::records::RawRecord;

// `\d` is Unicode-aware, so full-width digits from OCR (`４０`) match too.
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number pattern should compile"));

static ALL_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("all-digits pattern should compile"));

static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("digit pattern should compile"));

/// Source-language field labels as they appear in the extracted text.
pub mod keys {
    pub const YEAR: &str = "年份";
    pub const UNDERGRADUATE_MAJOR: &str = "本科专业";
    pub const INSTITUTION_NAME: &str = "院校名称";
    pub const JOINT_TRAINING_SCHOOL: &str = "联合培养学校";
    pub const ENROLLMENT: &str = "专业招生人数";
    pub const EXAM_SUBJECTS: &str = "考试科目";
    pub const TUITION: &str = "学费";
    pub const LOWEST_SCORE: &str = "录取最低分";
}

/// One admissions listing in the output schema.
///
/// String fields are `None` when the source key was missing from the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionRecord {
    pub year: Option<i64>,
    pub undergraduate_major: Option<String>,
    pub institution_name: Option<String>,
    pub joint_training_school: Option<String>,
    pub enrollment: Option<i64>,
    pub exam_subjects: Option<String>,
    pub tuition: Option<i64>,
    pub lowest_score: Option<i64>,
}

impl AdmissionRecord {
    pub fn from_raw(raw: &RawRecord) -> Self {
        let text = |key: &str| raw.get(key).map(str::to_string);

        Self {
            year: raw.get(keys::YEAR).and_then(parse_year),
            undergraduate_major: text(keys::UNDERGRADUATE_MAJOR),
            institution_name: text(keys::INSTITUTION_NAME),
            joint_training_school: text(keys::JOINT_TRAINING_SCHOOL),
            enrollment: raw.get(keys::ENROLLMENT).and_then(first_number),
            exam_subjects: text(keys::EXAM_SUBJECTS),
            tuition: raw.get(keys::TUITION).and_then(digits_only),
            lowest_score: raw.get(keys::LOWEST_SCORE).and_then(digits_only),
        }
    }
}

/// Year as an integer; empty values are absent and garbage is absent with a warning.
fn parse_year(value: &str) -> Option<i64> {
    if value.is_empty() {
        return None;
    }
    match normalize_digits(value).parse() {
        Ok(year) => Some(year),
        Err(_) => {
            tracing::warn!("Ignoring non-numeric {}: {:?}", keys::YEAR, value);
            None
        }
    }
}

/// First run of digits anywhere in the value, e.g. `"40人 展开详情"` -> 40.
pub fn first_number(value: &str) -> Option<i64> {
    normalize_digits(FIRST_NUMBER.find(value)?.as_str()).parse().ok()
}

/// The value as an integer only when it consists entirely of digits.
pub fn digits_only(value: &str) -> Option<i64> {
    if !ALL_DIGITS.is_match(value) {
        return None;
    }
    normalize_digits(value).parse().ok()
}

/// Replace every Unicode decimal digit with its ASCII equivalent, leaving
/// other characters untouched.
fn normalize_digits(value: &str) -> String {
    value
        .chars()
        .map(|c| match decimal_value(c) {
            Some(d) => char::from(b'0' + d as u8),
            None => c,
        })
        .collect()
}

fn is_decimal_digit(c: char) -> bool {
    c.is_ascii_digit() || (!c.is_ascii() && DECIMAL_DIGIT.is_match(c.encode_utf8(&mut [0; 4])))
}

/// Value of a decimal digit in any script.
///
/// Unicode allocates each decimal digit set as a contiguous run starting at
/// zero, and adjacent sets are packed back to back, so the value is the
/// distance to the start of the run modulo ten.
fn decimal_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut zero = c as u32;
    while let Some(prev) = zero
        .checked_sub(1)
        .and_then(char::from_u32)
        .filter(|&p| is_decimal_digit(p))
    {
        zero = prev as u32;
    }
    Some((c as u32 - zero) % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::records::parse_record;

    #[test]
    fn test_full_record() {
        let raw = parse_record(
            "年份: 2023\n本科专业: 计算机科学与技术\n院校名称: 清华大学\n联合培养学校: 无\n\
             专业招生人数: 40人 展开详情\n考试科目: 101政治 201英语一\n学费: 8000\n录取最低分: 385",
        );
        let record = AdmissionRecord::from_raw(&raw);
        assert_eq!(
            record,
            AdmissionRecord {
                year: Some(2023),
                undergraduate_major: Some("计算机科学与技术".to_string()),
                institution_name: Some("清华大学".to_string()),
                joint_training_school: Some("无".to_string()),
                enrollment: Some(40),
                exam_subjects: Some("101政治 201英语一".to_string()),
                tuition: Some(8000),
                lowest_score: Some(385),
            }
        );
    }

    #[test]
    fn test_missing_keys_are_absent() {
        let record = AdmissionRecord::from_raw(&RawRecord::default());
        assert_eq!(record, AdmissionRecord::default());
    }

    #[test]
    fn test_enrollment_extraction() {
        assert_eq!(first_number("40人 展开详情"), Some(40));
        assert_eq!(first_number("约 12 人，含推免 3 人"), Some(12));
        assert_eq!(first_number("不详"), None);
        assert_eq!(first_number(""), None);
    }

    #[test]
    fn test_tuition_requires_pure_digits() {
        assert_eq!(digits_only("8000"), Some(8000));
        assert_eq!(digits_only("8000元"), None);
        assert_eq!(digits_only("-8000"), None);
        assert_eq!(digits_only("+8000"), None);
        assert_eq!(digits_only(""), None);
        assert_eq!(digits_only("99999999999999999999999"), None);
    }

    #[test]
    fn test_lowest_score_non_numeric() {
        let mut raw = RawRecord::default();
        raw.insert(keys::LOWEST_SCORE, "暂无");
        raw.insert(keys::TUITION, "8000元/年");
        let record = AdmissionRecord::from_raw(&raw);
        assert_eq!(record.lowest_score, None);
        assert_eq!(record.tuition, None);
    }

    #[test]
    fn test_year_coercion() {
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("2020年"), None);
    }

    #[test]
    fn test_full_width_digits() {
        assert_eq!(first_number("约４０人，3个方向"), Some(40));
        assert_eq!(first_number("４０人"), Some(40));
        assert_eq!(digits_only("８０００"), Some(8000));
        assert_eq!(digits_only("８０００元"), None);
        assert_eq!(parse_year("２０２０"), Some(2020));
    }

    #[test]
    fn test_other_script_digits() {
        // Arabic-Indic and Devanagari
        assert_eq!(first_number("٤٠ seats"), Some(40));
        assert_eq!(digits_only("३८५"), Some(385));
    }

    #[test]
    fn test_full_width_record() {
        let raw = parse_record("年份: ２０２３\n专业招生人数: ４０人\n学费：８０００\n录取最低分: ３８５");
        let record = AdmissionRecord::from_raw(&raw);
        assert_eq!(record.year, Some(2023));
        assert_eq!(record.enrollment, Some(40));
        assert_eq!(record.tuition, Some(8000));
        assert_eq!(record.lowest_score, Some(385));
    }

    #[test]
    fn test_empty_string_field_is_present() {
        let raw = parse_record("联合培养学校:");
        let record = AdmissionRecord::from_raw(&raw);
        assert_eq!(record.joint_training_school, Some(String::new()));
        assert_eq!(record.institution_name, None);
    }
}

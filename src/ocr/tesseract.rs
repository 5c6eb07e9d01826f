//! Tesseract OCR backend implementation.
//!
//! Runs the `tesseract` binary with TSV output so every word comes back with
//! its bounding box. Words on the same Tesseract line are merged into one
//! region, which matches the line-level boxes detection models report.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrOutput, OcrRegion};
use super::model_utils::check_binary;

/// TSV `level` value for word rows.
const WORD_LEVEL: u32 = 5;

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Run Tesseract on an image file and return raw TSV.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .arg("tsv")
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!(
                        "tesseract failed: {}",
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if !check_binary("tesseract") {
            "Tesseract not installed. Install with: apt install tesseract-ocr tesseract-ocr-chi-sim"
                .to_string()
        } else {
            "Tesseract is available".to_string()
        }
    }

    fn ocr_regions(&self, image_path: &Path) -> Result<OcrOutput, OcrError> {
        let start = Instant::now();
        let tsv = self.run_tesseract(image_path)?;
        let regions = parse_tsv_regions(&tsv, word_separator(&self.config.language));

        Ok(OcrOutput {
            regions,
            backend: OcrBackendType::Tesseract,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Separator placed between words of one Tesseract line.
///
/// CJK scripts are segmented per glyph by Tesseract, so their words are glued
/// back together without spaces.
pub fn word_separator(language: &str) -> &'static str {
    let cjk = language.split('+').all(|lang| {
        lang.starts_with("chi") || lang.starts_with("jpn") || lang.starts_with("kor")
    });
    if cjk {
        ""
    } else {
        " "
    }
}

struct LineAccumulator {
    words: Vec<String>,
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
    conf_sum: f32,
}

/// Parse Tesseract TSV into one region per recognized line, in reading order.
pub fn parse_tsv_regions(tsv: &str, separator: &str) -> Vec<OcrRegion> {
    let mut lines: BTreeMap<(u32, u32, u32, u32), LineAccumulator> = BTreeMap::new();

    // First row is the column header.
    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let level: u32 = cols[0].parse().unwrap_or(0);
        if level != WORD_LEVEL {
            continue;
        }
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let field = |idx: usize| cols[idx].parse::<u32>().unwrap_or(0);
        let key = (field(1), field(2), field(3), field(4));
        let (left, top, width, height) = (field(6), field(7), field(8), field(9));

        let line = lines.entry(key).or_insert_with(|| LineAccumulator {
            words: Vec::new(),
            left,
            top,
            right: left + width,
            bottom: top + height,
            conf_sum: 0.0,
        });
        line.words.push(text.to_string());
        line.left = line.left.min(left);
        line.top = line.top.min(top);
        line.right = line.right.max(left + width);
        line.bottom = line.bottom.max(top + height);
        line.conf_sum += conf;
    }

    lines
        .into_values()
        .map(|line| {
            let confidence = line.conf_sum / line.words.len() as f32 / 100.0;
            OcrRegion::from_rect(
                line.words.join(separator),
                line.left as f32,
                line.top as f32,
                (line.right - line.left) as f32,
                (line.bottom - line.top) as f32,
            )
            .with_confidence(confidence)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_words_on_one_line_merge_into_union_box() {
        let input = tsv(&[
            "4\t1\t1\t1\t1\t0\t10\t20\t200\t30\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t22\t40\t28\t96.5\t院校",
            "5\t1\t1\t1\t1\t2\t52\t20\t40\t30\t93.5\t名称",
        ]);
        let regions = parse_tsv_regions(&input, "");
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].text, "院校名称");
        assert_eq!(regions[0].min_x(), 10.0);
        assert_eq!(regions[0].max_x(), 92.0);
        assert_eq!(regions[0].min_y(), 20.0);
        assert_eq!(regions[0].confidence, Some(0.95));
    }

    #[test]
    fn test_separate_lines_stay_separate() {
        let input = tsv(&[
            "5\t1\t1\t1\t1\t1\t10\t20\t40\t28\t90\tyear:",
            "5\t1\t1\t1\t1\t2\t60\t20\t40\t28\t90\t2020",
            "5\t1\t1\t1\t2\t1\t10\t70\t40\t28\t90\tfee:",
        ]);
        let regions = parse_tsv_regions(&input, " ");
        let texts: Vec<&str> = regions.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["year: 2020", "fee:"]);
    }

    #[test]
    fn test_skips_empty_and_negative_confidence_rows() {
        let input = tsv(&[
            "5\t1\t1\t1\t1\t1\t10\t20\t40\t28\t-1\tghost",
            "5\t1\t1\t1\t1\t2\t10\t20\t40\t28\t80\t   ",
            "short\trow",
        ]);
        assert!(parse_tsv_regions(&input, " ").is_empty());
    }

    #[test]
    fn test_word_separator_by_language() {
        assert_eq!(word_separator("chi_sim"), "");
        assert_eq!(word_separator("chi_sim+jpn"), "");
        assert_eq!(word_separator("eng"), " ");
        assert_eq!(word_separator("chi_sim+eng"), " ");
    }
}

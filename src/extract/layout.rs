//! Reassembly of OCR hits into visual text lines.
//!
//! Hits are sorted top to bottom and scanned once. A line is anchored at the
//! `top_y` of the hit that opened it; each later hit joins the line while it
//! stays within the threshold of that anchor, not of the previous hit.

use crate::ocr::OcrRegion;

/// Default vertical tolerance for grouping hits into one line, in pixels.
pub const DEFAULT_LINE_THRESHOLD: f32 = 20.0;

/// One recognized span in whole-image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrHit {
    pub text: String,
    pub left_x: f32,
    pub right_x: f32,
    pub top_y: f32,
}

impl OcrHit {
    /// Translate a band-local region into whole-image coordinates.
    pub fn from_region(region: &OcrRegion, band_top: u32) -> Self {
        Self {
            text: region.text.clone(),
            left_x: region.min_x(),
            right_x: region.max_x(),
            top_y: band_top as f32 + region.min_y(),
        }
    }
}

/// Hits sharing a vertical position, ordered by ascending `left_x`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    hits: Vec<OcrHit>,
}

impl TextLine {
    fn new(mut hits: Vec<OcrHit>) -> Self {
        hits.sort_by(|a, b| a.left_x.total_cmp(&b.left_x));
        Self { hits }
    }

    pub fn hits(&self) -> &[OcrHit] {
        &self.hits
    }

    /// The line's text: hit texts joined by single spaces.
    pub fn render(&self) -> String {
        self.hits
            .iter()
            .map(|hit| hit.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Group hits into lines, top to bottom.
pub fn group_lines(mut hits: Vec<OcrHit>, threshold: f32) -> Vec<TextLine> {
    hits.sort_by(|a, b| a.top_y.total_cmp(&b.top_y));

    let mut lines = Vec::new();
    let mut current: Vec<OcrHit> = Vec::new();
    let mut anchor = 0.0_f32;

    for hit in hits {
        if !current.is_empty() && (hit.top_y - anchor).abs() > threshold {
            lines.push(TextLine::new(std::mem::take(&mut current)));
        }
        if current.is_empty() {
            anchor = hit.top_y;
        }
        current.push(hit);
    }
    if !current.is_empty() {
        lines.push(TextLine::new(current));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(text: &str, left_x: f32, top_y: f32) -> OcrHit {
        OcrHit {
            text: text.to_string(),
            left_x,
            right_x: left_x + 10.0,
            top_y,
        }
    }

    fn tops(lines: &[TextLine]) -> Vec<Vec<f32>> {
        lines
            .iter()
            .map(|line| line.hits().iter().map(|h| h.top_y).collect())
            .collect()
    }

    #[test]
    fn test_line_opens_past_threshold_from_anchor() {
        let lines = group_lines(
            vec![hit("a", 0.0, 0.0), hit("b", 10.0, 5.0), hit("c", 0.0, 26.0)],
            DEFAULT_LINE_THRESHOLD,
        );
        assert_eq!(tops(&lines), vec![vec![0.0, 5.0], vec![26.0]]);
    }

    #[test]
    fn test_compares_against_anchor_not_previous_hit() {
        // 15 -> 30 is within 20 of the previous hit but 30 away from the anchor.
        let lines = group_lines(
            vec![hit("a", 0.0, 0.0), hit("b", 0.0, 15.0), hit("c", 0.0, 30.0)],
            DEFAULT_LINE_THRESHOLD,
        );
        assert_eq!(tops(&lines), vec![vec![0.0, 15.0], vec![30.0]]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let lines = group_lines(
            vec![hit("a", 0.0, 100.0), hit("b", 5.0, 120.0)],
            DEFAULT_LINE_THRESHOLD,
        );
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_five_hit_sequence() {
        let lines = group_lines(
            vec![
                hit("a", 0.0, 0.0),
                hit("b", 0.0, 5.0),
                hit("c", 0.0, 25.0),
                hit("d", 0.0, 26.0),
                hit("e", 0.0, 50.0),
            ],
            DEFAULT_LINE_THRESHOLD,
        );
        assert_eq!(
            tops(&lines),
            vec![vec![0.0, 5.0], vec![25.0, 26.0], vec![50.0]]
        );
    }

    #[test]
    fn test_words_ordered_left_to_right() {
        let lines = group_lines(
            vec![
                hit("2020", 300.0, 12.0),
                hit("年份:", 20.0, 10.0),
                hit("专业招生人数:", 0.0, 60.0),
                hit("展开详情", 400.0, 58.0),
                hit("40人", 200.0, 61.0),
            ],
            DEFAULT_LINE_THRESHOLD,
        );
        let rendered: Vec<String> = lines.iter().map(TextLine::render).collect();
        assert_eq!(rendered, vec!["年份: 2020", "专业招生人数: 40人 展开详情"]);
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_top() {
        let lines = group_lines(
            vec![hit("third", 0.0, 90.0), hit("first", 0.0, 1.0), hit("second", 0.0, 45.0)],
            DEFAULT_LINE_THRESHOLD,
        );
        let rendered: Vec<String> = lines.iter().map(TextLine::render).collect();
        assert_eq!(rendered, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_no_hits_no_lines() {
        assert!(group_lines(Vec::new(), DEFAULT_LINE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_hit_translation_adds_band_offset() {
        let region = OcrRegion::from_rect("学费", 15.0, 30.0, 50.0, 20.0);
        let hit = OcrHit::from_region(&region, 2000);
        assert_eq!(hit.left_x, 15.0);
        assert_eq!(hit.right_x, 65.0);
        assert_eq!(hit.top_y, 2030.0);
    }
}

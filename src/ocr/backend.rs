//! OCR backend abstraction.
//!
//! Every backend turns one image file into positioned text regions. Band
//! slicing and line assembly happen above this layer, so a backend only has to
//! report what it saw and where.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One recognized text span as reported by an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrRegion {
    /// Recognized text.
    pub text: String,
    /// Bounding quadrilateral, image-local, clockwise from top-left.
    pub quad: [Point; 4],
    /// Engine confidence (0.0 - 1.0), if available.
    pub confidence: Option<f32>,
}

impl OcrRegion {
    /// Build a region from an axis-aligned rectangle.
    pub fn from_rect(text: impl Into<String>, left: f32, top: f32, width: f32, height: f32) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self {
            text: text.into(),
            quad: [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn min_x(&self) -> f32 {
        self.quad.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }

    pub fn max_x(&self) -> f32 {
        self.quad.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn min_y(&self) -> f32 {
        self.quad.iter().map(|p| p.y).fold(f32::INFINITY, f32::min)
    }
}

/// Result of running OCR over one image.
#[derive(Debug, Clone)]
pub struct OcrOutput {
    /// Regions in engine order.
    pub regions: Vec<OcrRegion>,
    /// Which backend produced this result.
    pub backend: OcrBackendType,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    #[default]
    Tesseract,
    /// PaddleOCR (RapidOCR models) via ONNX Runtime.
    #[serde(alias = "paddle")]
    PaddleOcr,
}

impl OcrBackendType {
    pub const ALL: [OcrBackendType; 2] = [OcrBackendType::Tesseract, OcrBackendType::PaddleOcr];

    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::PaddleOcr => "paddleocr",
        }
    }

    /// Human-readable name for status output.
    pub fn display_name(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "Tesseract",
            OcrBackendType::PaddleOcr => "PaddleOCR",
        }
    }
}

impl fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OcrBackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tesseract" => Ok(OcrBackendType::Tesseract),
            "paddleocr" | "paddle" => Ok(OcrBackendType::PaddleOcr),
            other => Err(format!(
                "unknown OCR backend '{}' (expected tesseract or paddleocr)",
                other
            )),
        }
    }
}

/// Trait for OCR backends.
pub trait OcrBackend {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend is available (dependencies installed, models present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file and return positioned text regions.
    fn ocr_regions(&self, image_path: &Path) -> Result<OcrOutput, OcrError>;
}

/// Configuration for OCR backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Backend to run.
    pub backend: OcrBackendType,
    /// Language for OCR (e.g., "eng", "chi_sim").
    pub language: String,
    /// Path to model files (for backends that need them).
    pub model_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendType::default(),
            language: "chi_sim".to_string(),
            model_path: None,
        }
    }
}

/// Construct the configured backend.
///
/// Backends behind a disabled cargo feature report `BackendNotAvailable`.
pub fn create_backend(config: &OcrConfig) -> Result<Box<dyn OcrBackend>, OcrError> {
    create_backend_of(config.backend, config)
}

/// Construct a specific backend type with the given configuration.
pub fn create_backend_of(
    backend_type: OcrBackendType,
    config: &OcrConfig,
) -> Result<Box<dyn OcrBackend>, OcrError> {
    match backend_type {
        OcrBackendType::Tesseract => Ok(Box::new(super::TesseractBackend::with_config(
            config.clone(),
        ))),
        #[cfg(feature = "ocr-paddle")]
        OcrBackendType::PaddleOcr => Ok(Box::new(super::PaddleBackend::with_config(
            config.clone(),
        ))),
        #[cfg(not(feature = "ocr-paddle"))]
        OcrBackendType::PaddleOcr => Err(OcrError::BackendNotAvailable(
            "PaddleOCR not compiled (enable the ocr-paddle feature)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_parsing() {
        assert_eq!(
            "tesseract".parse::<OcrBackendType>(),
            Ok(OcrBackendType::Tesseract)
        );
        assert_eq!(
            "Paddle".parse::<OcrBackendType>(),
            Ok(OcrBackendType::PaddleOcr)
        );
        assert!("easyocr".parse::<OcrBackendType>().is_err());
        assert_eq!(OcrBackendType::PaddleOcr.to_string(), "paddleocr");
    }

    #[test]
    fn test_region_extents_from_skewed_quad() {
        let region = OcrRegion {
            text: "院校名称".to_string(),
            quad: [
                Point::new(12.0, 40.0),
                Point::new(90.0, 38.5),
                Point::new(91.0, 60.0),
                Point::new(11.5, 62.0),
            ],
            confidence: Some(0.93),
        };
        assert_eq!(region.min_x(), 11.5);
        assert_eq!(region.max_x(), 91.0);
        assert_eq!(region.min_y(), 38.5);
    }

    #[test]
    fn test_region_from_rect() {
        let region = OcrRegion::from_rect("学费", 10.0, 20.0, 30.0, 5.0);
        assert_eq!(region.min_x(), 10.0);
        assert_eq!(region.max_x(), 40.0);
        assert_eq!(region.min_y(), 20.0);
        assert_eq!(region.confidence, None);
    }

    #[test]
    fn test_config_deserializes_backend_alias() {
        let config: OcrConfig = toml::from_str("backend = \"paddle\"").unwrap();
        assert_eq!(config.backend, OcrBackendType::PaddleOcr);
        assert_eq!(config.language, "chi_sim");
    }
}

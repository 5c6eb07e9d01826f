//! OCR module.
//!
//! Turns images into positioned text regions using:
//! - Tesseract OCR via its TSV output (default)
//! - PaddleOCR for CNN-based OCR via ONNX (feature: ocr-paddle)
//!
//! Use [`create_backend`] to build the backend named in [`OcrConfig`].

mod backend;
mod model_utils;
mod tesseract;

#[cfg(feature = "ocr-paddle")]
mod paddle_backend;

pub use backend::{
    create_backend, create_backend_of, OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrOutput,
    OcrRegion, Point,
};
pub use model_utils::check_binary;
pub use tesseract::{parse_tsv_regions, TesseractBackend};

#[cfg(feature = "ocr-paddle")]
pub use paddle_backend::PaddleBackend;

//! PaddleOCR backend implementation.
//!
//! Uses paddle-ocr-rs for OCR via ONNX Runtime with the RapidOCR model family.
//! Detection yields quadrilaterals per text line, which map directly onto
//! [`OcrRegion`].
//!
//! Models are automatically downloaded on first use from:
//! https://github.com/RapidAI/RapidOCR

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use paddle_ocr_rs::ocr_lite::OcrLite;

use super::backend::{
    OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrOutput, OcrRegion, Point,
};
use super::model_utils::{
    ensure_models_present, model_availability_hint, ModelDirConfig, ModelSpec,
};

/// Model directory configuration for PaddleOCR.
const MODEL_CONFIG: ModelDirConfig = ModelDirConfig {
    subdir: "paddle-ocr",
    required_files: &[DET_MODEL_NAME, REC_MODEL_NAME, CLS_MODEL_NAME],
};

const DET_MODEL_NAME: &str = "ch_PP-OCRv4_det_infer.onnx";
const REC_MODEL_NAME: &str = "ch_PP-OCRv4_rec_infer.onnx";
const CLS_MODEL_NAME: &str = "ch_ppocr_mobile_v2.0_cls_infer.onnx";

const DET_MODEL: ModelSpec = ModelSpec {
    url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_det_infer.onnx",
    filename: DET_MODEL_NAME,
    size_hint: "4 MB",
};

const REC_MODEL: ModelSpec = ModelSpec {
    url: "https://huggingface.co/SWHL/RapidOCR/resolve/main/PP-OCRv4/ch_PP-OCRv4_rec_infer.onnx",
    filename: REC_MODEL_NAME,
    size_hint: "10 MB",
};

const CLS_MODEL: ModelSpec = ModelSpec {
    url: "https://www.modelscope.cn/models/RapidAI/RapidOCR/resolve/v3.4.0/onnx/PP-OCRv4/cls/ch_ppocr_mobile_v2.0_cls_infer.onnx",
    filename: CLS_MODEL_NAME,
    size_hint: "1 MB",
};

/// PaddleOCR backend via ONNX Runtime.
///
/// The engine is loaded lazily on the first band and reused for the rest of
/// the run.
pub struct PaddleBackend {
    config: OcrConfig,
    engine: Mutex<Option<OcrLite>>,
}

impl PaddleBackend {
    /// Create a new PaddleOCR backend with default configuration.
    pub fn new() -> Self {
        Self::with_config(OcrConfig::default())
    }

    /// Create a new PaddleOCR backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self {
            config,
            engine: Mutex::new(None),
        }
    }

    fn model_dir(&self) -> Result<PathBuf, OcrError> {
        ensure_models_present(
            self.config.model_path.as_ref(),
            &MODEL_CONFIG,
            &[&DET_MODEL, &REC_MODEL, &CLS_MODEL],
        )
    }

    fn init_engine(&self) -> Result<OcrLite, OcrError> {
        let model_dir = self.model_dir()?;
        let path_of = |name: &str| -> Result<String, OcrError> {
            let path = model_dir.join(name);
            if !path.exists() {
                return Err(OcrError::ModelNotFound(path.display().to_string()));
            }
            Ok(path.to_string_lossy().to_string())
        };

        let det_model = path_of(DET_MODEL_NAME)?;
        let cls_model = path_of(CLS_MODEL_NAME)?;
        let rec_model = path_of(REC_MODEL_NAME)?;

        let mut ocr = OcrLite::new();
        ocr.init_models(&det_model, &cls_model, &rec_model, 4)
            .map_err(|e| OcrError::OcrFailed(format!("Failed to init PaddleOCR: {}", e)))?;
        tracing::debug!("PaddleOCR engine loaded from {}", model_dir.display());
        Ok(ocr)
    }

    fn run_paddle(&self, image_path: &Path) -> Result<Vec<OcrRegion>, OcrError> {
        let mut guard = self
            .engine
            .lock()
            .map_err(|e| OcrError::OcrFailed(format!("Failed to lock OCR engine: {}", e)))?;
        if guard.is_none() {
            *guard = Some(self.init_engine()?);
        }
        let ocr = guard
            .as_mut()
            .ok_or_else(|| OcrError::OcrFailed("OCR engine not initialized".to_string()))?;

        let path = image_path.to_str().ok_or_else(|| {
            OcrError::OcrFailed(format!("non UTF-8 image path: {}", image_path.display()))
        })?;
        let result = ocr
            .detect_from_path(
                path,
                50,    // padding
                2000,  // max side length, matches the default band height
                0.5,   // box score threshold
                0.3,   // box threshold
                1.6,   // unclip ratio
                false, // do angle
                false, // most angle
            )
            .map_err(|e| OcrError::OcrFailed(format!("PaddleOCR detection failed: {}", e)))?;

        let mut regions = Vec::with_capacity(result.text_blocks.len());
        for block in &result.text_blocks {
            let points: Vec<Point> = block
                .box_points
                .iter()
                .map(|p| Point::new(p.x as f32, p.y as f32))
                .collect();
            let quad: [Point; 4] = match points.try_into() {
                Ok(quad) => quad,
                Err(points) => {
                    tracing::warn!(
                        "Skipping text block with {} box points: {:?}",
                        points.len(),
                        block.text
                    );
                    continue;
                }
            };
            regions.push(OcrRegion {
                text: block.text.clone(),
                quad,
                confidence: Some(block.text_score as f32),
            });
        }

        Ok(regions)
    }
}

impl Default for PaddleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for PaddleBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::PaddleOcr
    }

    fn is_available(&self) -> bool {
        // Models are auto-downloaded on first use
        true
    }

    fn availability_hint(&self) -> String {
        model_availability_hint(
            self.config.model_path.as_ref(),
            &MODEL_CONFIG,
            "PaddleOCR",
            "15 MB",
        )
    }

    fn ocr_regions(&self, image_path: &Path) -> Result<OcrOutput, OcrError> {
        let start = Instant::now();
        let regions = self.run_paddle(image_path)?;
        Ok(OcrOutput {
            regions,
            backend: OcrBackendType::PaddleOcr,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

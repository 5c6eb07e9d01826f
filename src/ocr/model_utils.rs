//! Shared utilities for OCR backends.
//!
//! Provides common functionality for:
//! - Downloading and locating OCR models
//! - Checking for CLI tool availability

// Model handling is only reachable when a model-based backend is compiled in.
#![cfg_attr(not(feature = "ocr-paddle"), allow(dead_code))]

use std::path::{Path, PathBuf};
use std::process::Command;

use super::backend::OcrError;

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Model file specification for downloading.
pub struct ModelSpec {
    /// URL to download from.
    pub url: &'static str,
    /// Filename to save as.
    pub filename: &'static str,
    /// Human-readable size for progress messages.
    pub size_hint: &'static str,
}

/// Configuration for model directory management.
pub struct ModelDirConfig {
    /// Subdirectory name under the data dir (e.g., "paddle-ocr").
    pub subdir: &'static str,
    /// Required model files to check for presence.
    pub required_files: &'static [&'static str],
}

impl ModelDirConfig {
    /// Get the default model directory for this backend.
    pub fn default_dir(&self) -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("admissions-ocr")
            .join(self.subdir)
    }

    /// Get standard candidate directories to search for models.
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        [
            Some(self.default_dir()),
            dirs::home_dir().map(|d| d.join(format!(".{}", self.subdir)).join("models")),
            Some(PathBuf::from(format!("./models/{}", self.subdir))),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Check if a directory contains all required model files.
    pub fn has_required_files(&self, dir: &Path) -> bool {
        self.required_files
            .iter()
            .all(|file| dir.join(file).exists())
    }
}

/// Download a file from a URL to a local path using curl or wget.
pub fn download_file(url: &str, dest: &Path) -> Result<(), OcrError> {
    let output = Command::new("curl")
        .args(["-fSL", "--progress-bar", "-o"])
        .arg(dest)
        .arg(url)
        .status();

    match output {
        Ok(status) if status.success() => Ok(()),
        Ok(_) => {
            let _ = std::fs::remove_file(dest);
            Err(OcrError::OcrFailed(format!("Failed to download {}", url)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let output = Command::new("wget")
                .args(["-q", "--show-progress", "-O"])
                .arg(dest)
                .arg(url)
                .status();

            match output {
                Ok(status) if status.success() => Ok(()),
                Ok(_) => {
                    let _ = std::fs::remove_file(dest);
                    Err(OcrError::OcrFailed(format!("Failed to download {}", url)))
                }
                Err(_) => Err(OcrError::BackendNotAvailable(
                    "Neither curl nor wget found. Install one to download models.".to_string(),
                )),
            }
        }
        Err(e) => Err(OcrError::Io(e)),
    }
}

/// Download a model file if it doesn't exist.
pub fn ensure_model_file(spec: &ModelSpec, model_dir: &Path) -> Result<(), OcrError> {
    let dest = model_dir.join(spec.filename);
    if !dest.exists() {
        tracing::info!("Downloading {} (~{})", spec.filename, spec.size_hint);
        download_file(spec.url, &dest)?;
        tracing::info!("Downloaded {}", spec.filename);
    }
    Ok(())
}

/// Find model directory by checking config path first, then standard locations.
pub fn find_model_dir(config_path: Option<&PathBuf>, model_config: &ModelDirConfig) -> Option<PathBuf> {
    if let Some(path) = config_path {
        if model_config.has_required_files(path) {
            return Some(path.clone());
        }
    }

    model_config
        .candidate_dirs()
        .into_iter()
        .find(|dir| model_config.has_required_files(dir))
}

/// Ensure models are present, downloading if necessary.
///
/// Downloads go to the configured path when one is set, otherwise to the
/// default data directory.
pub fn ensure_models_present(
    config_path: Option<&PathBuf>,
    model_config: &ModelDirConfig,
    model_specs: &[&ModelSpec],
) -> Result<PathBuf, OcrError> {
    if let Some(dir) = find_model_dir(config_path, model_config) {
        return Ok(dir);
    }

    let model_dir = config_path
        .cloned()
        .unwrap_or_else(|| model_config.default_dir());
    std::fs::create_dir_all(&model_dir)?;

    for spec in model_specs {
        ensure_model_file(spec, &model_dir)?;
    }

    Ok(model_dir)
}

/// Format availability hint for a model-based backend.
pub fn model_availability_hint(
    config_path: Option<&PathBuf>,
    model_config: &ModelDirConfig,
    backend_name: &str,
    total_size: &str,
) -> String {
    match find_model_dir(config_path, model_config) {
        Some(path) => format!("{} models found at {:?}", backend_name, path),
        None => format!(
            "{} models will be auto-downloaded on first use (~{}) to {:?}",
            backend_name,
            total_size,
            config_path
                .cloned()
                .unwrap_or_else(|| model_config.default_dir())
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CONFIG: ModelDirConfig = ModelDirConfig {
        subdir: "test-ocr",
        required_files: &["det.onnx", "rec.onnx"],
    };

    #[test]
    fn test_has_required_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!TEST_CONFIG.has_required_files(dir.path()));

        std::fs::write(dir.path().join("det.onnx"), b"").unwrap();
        assert!(!TEST_CONFIG.has_required_files(dir.path()));

        std::fs::write(dir.path().join("rec.onnx"), b"").unwrap();
        assert!(TEST_CONFIG.has_required_files(dir.path()));
    }

    #[test]
    fn test_configured_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("det.onnx"), b"").unwrap();
        std::fs::write(dir.path().join("rec.onnx"), b"").unwrap();

        let configured = dir.path().to_path_buf();
        assert_eq!(
            find_model_dir(Some(&configured), &TEST_CONFIG),
            Some(configured.clone())
        );
        assert!(model_availability_hint(Some(&configured), &TEST_CONFIG, "Test", "1 MB")
            .contains("models found"));
    }
}

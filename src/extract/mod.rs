//! Band-sliced OCR extraction.
//!
//! Tall screenshots are cut into full-width bands, each band is run through an
//! OCR backend, and the hits from every band are reassembled into visual lines
//! of text in whole-image coordinates.

mod bands;
mod layout;

use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tempfile::TempDir;
use thiserror::Error;

use crate::ocr::{OcrBackend, OcrError};

pub use bands::{split_bands, Band, DEFAULT_BAND_HEIGHT};
pub use layout::{group_lines, OcrHit, TextLine, DEFAULT_LINE_THRESHOLD};

/// Errors from the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write band {index} to {path}: {source}")]
    BandEncode {
        index: usize,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("OCR failed on band {index} (rows {top}..{bottom}): {source}")]
    Ocr {
        index: usize,
        top: u32,
        bottom: u32,
        #[source]
        source: OcrError,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tunables for band slicing and line grouping.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub band_height: NonZeroU32,
    pub line_threshold: f32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            band_height: NonZeroU32::new(DEFAULT_BAND_HEIGHT).unwrap_or(NonZeroU32::MIN),
            line_threshold: DEFAULT_LINE_THRESHOLD,
        }
    }
}

/// Runs one OCR backend over every band of an image.
pub struct BandExtractor<'a> {
    backend: &'a dyn OcrBackend,
    options: ExtractOptions,
    progress: ProgressBar,
}

impl<'a> BandExtractor<'a> {
    pub fn new(backend: &'a dyn OcrBackend, options: ExtractOptions) -> Self {
        Self {
            backend,
            options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report per-band progress on the given bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// OCR every band of the image and return all hits in whole-image coordinates.
    pub fn collect_hits(&self, image_path: &Path) -> Result<Vec<OcrHit>, ExtractError> {
        let img = image::open(image_path).map_err(|source| ExtractError::ImageLoad {
            path: image_path.to_path_buf(),
            source,
        })?;
        let (width, height) = (img.width(), img.height());
        let bands = split_bands(height, self.options.band_height);
        tracing::info!(
            "{}: {}x{} px, {} band(s) of up to {} rows",
            image_path.display(),
            width,
            height,
            bands.len(),
            self.options.band_height
        );

        let temp_dir = TempDir::new().map_err(|source| ExtractError::Io {
            path: std::env::temp_dir(),
            source,
        })?;

        self.progress.set_length(bands.len() as u64);
        let mut hits = Vec::new();
        for (index, band) in bands.iter().enumerate() {
            let band_path = temp_dir.path().join(format!("band-{:04}.png", index));
            img.crop_imm(0, band.top, width, band.height)
                .save(&band_path)
                .map_err(|source| ExtractError::BandEncode {
                    index,
                    path: band_path.clone(),
                    source,
                })?;

            let output =
                self.backend
                    .ocr_regions(&band_path)
                    .map_err(|source| ExtractError::Ocr {
                        index,
                        top: band.top,
                        bottom: band.bottom(),
                        source,
                    })?;
            tracing::debug!(
                "Band {} (rows {}..{}): {} region(s) via {} in {}ms",
                index,
                band.top,
                band.bottom(),
                output.regions.len(),
                output.backend,
                output.processing_time_ms
            );

            for region in &output.regions {
                tracing::trace!("{:?} confidence={:?}", region.text, region.confidence);
                hits.push(OcrHit::from_region(region, band.top));
            }
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        Ok(hits)
    }

    /// OCR the image and return its text lines, top to bottom.
    pub fn extract_lines(&self, image_path: &Path) -> Result<Vec<String>, ExtractError> {
        let hits = self.collect_hits(image_path)?;
        let hit_count = hits.len();
        let lines: Vec<String> = group_lines(hits, self.options.line_threshold)
            .iter()
            .map(TextLine::render)
            .collect();
        tracing::info!("Grouped {} hit(s) into {} line(s)", hit_count, lines.len());
        Ok(lines)
    }

    /// OCR the image and write one line of text per visual row to `output`.
    ///
    /// Returns the number of lines written.
    pub fn extract_to_file(&self, image_path: &Path, output: &Path) -> Result<usize, ExtractError> {
        let lines = self.extract_lines(image_path)?;
        write_lines(output, &lines)?;
        Ok(lines.len())
    }
}

/// Write lines to `path`, each terminated by a newline, replacing any existing file.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<(), ExtractError> {
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    fs::write(path, contents).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })
}

//! Image-to-text extraction command.

use anyhow::Context;
use console::style;

use crate::cli::helpers::band_progress;
use crate::config::Config;
use crate::extract::BandExtractor;
use crate::ocr::create_backend;

/// OCR the configured image and write its lines of text.
pub fn cmd_extract(config: &Config) -> anyhow::Result<()> {
    let options = config.extract.options()?;
    let backend = create_backend(&config.ocr)?;
    if !backend.is_available() {
        anyhow::bail!(
            "OCR backend {} is not available: {}",
            backend.backend_type(),
            backend.availability_hint()
        );
    }

    let image = &config.extract.image;
    let output = &config.extract.output;
    tracing::info!(
        "Extracting {} with {} ({})",
        image.display(),
        backend.backend_type(),
        config.ocr.language
    );

    let lines = BandExtractor::new(backend.as_ref(), options)
        .with_progress(band_progress())
        .extract_to_file(image, output)
        .with_context(|| format!("Failed to extract text from {}", image.display()))?;

    println!(
        "{} Wrote {} line(s) to {}",
        style("✓").green(),
        lines,
        output.display()
    );
    Ok(())
}

//! OCR backend availability report.

use console::style;

use crate::config::Config;
use crate::ocr::{create_backend_of, OcrBackendType};

/// Print which OCR backends can run on this machine.
pub fn cmd_ocr_check(config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("OCR Backends").bold());
    println!("{}", "-".repeat(50));

    for backend_type in OcrBackendType::ALL {
        let name = backend_type.display_name();
        match create_backend_of(backend_type, &config.ocr) {
            Ok(backend) => {
                let status = if backend.is_available() {
                    style("✓ available").green()
                } else {
                    style("✗ not available").red()
                };
                println!("  {:<15} {}", name, status);
                println!("                  {}", style(backend.availability_hint()).dim());
            }
            Err(e) => {
                println!("  {:<15} {}", name, style(e.to_string()).dim());
            }
        }
    }

    println!("\n{}", style("Configured Backend:").cyan());
    println!(
        "  {} (language: {})",
        config.ocr.backend.display_name(),
        config.ocr.language
    );
    Ok(())
}

//! Text-to-SQL conversion command.

use anyhow::Context;
use console::style;

use crate::config::Config;
use crate::convert::convert_file;

/// Convert the configured text file into SQL.
pub fn cmd_convert(config: &Config) -> anyhow::Result<()> {
    let input = &config.convert.input;
    let output = &config.convert.output;

    let conversion = convert_file(input, output, &config.convert.options())
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    if conversion.skipped > 0 {
        println!(
            "{} Skipped {} empty record(s)",
            style("!").yellow(),
            conversion.skipped
        );
    }
    println!(
        "{} SQL for {} row(s) saved to {}",
        style("✓").green(),
        conversion.rows,
        output.display()
    );
    Ok(())
}

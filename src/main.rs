//! admissions-ocr command-line entry point.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admissions_ocr::cli;

fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let default_filter = if cli::is_verbose() {
        "admissions_ocr=info"
    } else {
        "admissions_ocr=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::run()
}

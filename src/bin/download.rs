use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use ocrviz::{OcrClientBuilder, DEFAULT_ENDPOINT};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Sends an image to the OCR service and stores the result next to it as JSON.
#[derive(Debug, Parser)]
#[command(name = "ocr-download", version)]
struct Args {
    /// Subscription key for the OCR service
    credential: String,
    image: PathBuf,
    #[arg(long, env = "OCR_API_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    #[arg(long, default_value = "unk")]
    language: String,
    /// Request timeout in seconds, none by default
    #[arg(long)]
    timeout: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = OcrClientBuilder::new(args.credential)
        .endpoint(args.endpoint)
        .language(args.language)
        .timeout(args.timeout.map(Duration::from_secs))
        .build()
        .context("Failed to build OCR client")?;

    let (_, json_path) = client
        .acquire(&args.image)
        .with_context(|| format!("OCR failed for {}", args.image.display()))?;
    log::info!("Saved {}", json_path.display());
    Ok(())
}

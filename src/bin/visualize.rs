use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ocrviz::{
    OcrClientBuilder, OcrResult, RenderOptions, RenderOutcome, Renderer, DEFAULT_ENDPOINT,
};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Draws the boxes of a stored OCR result onto its image and rebuilds the
/// recognized text on a blank page.
#[derive(Debug, Parser)]
#[command(name = "ocr-visualize", version)]
struct Args {
    /// Subscription key, only used with --live
    credential: String,
    image: PathBuf,
    /// Existing directory receiving the rendered images
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
    /// TrueType font replacing the bundled DejaVu Sans Mono
    #[arg(long)]
    font: Option<PathBuf>,
    /// Ask the OCR service instead of reading the stored JSON
    #[arg(long)]
    live: bool,
    #[arg(long, env = "OCR_API_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Print the recognized text row by row in reading order
    #[arg(long)]
    print_text: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let renderer = Renderer::new(RenderOptions {
        out_dir: args.out_dir.clone(),
        font_path: args.font.clone(),
        ..RenderOptions::default()
    })
    .context("Failed to load font")?;

    let result = if args.live {
        let client = OcrClientBuilder::new(&args.credential)
            .endpoint(&args.endpoint)
            .build()
            .context("Failed to build OCR client")?;
        let image = std::fs::read(&args.image)
            .with_context(|| format!("Failed to read {}", args.image.display()))?;
        client.recognize(&image)?
    } else {
        ocrviz::util::load_result(&args.image)?
    };

    match renderer.render(&args.image, &result)? {
        RenderOutcome::NoText => {
            println!("No OCR data for {}", args.image.display());
        }
        RenderOutcome::Rendered {
            annotated,
            reconstructed,
        } => {
            log::info!("Wrote {} and {}", annotated.display(), reconstructed.display());
            if args.print_text {
                print_rows(&result);
            }
        }
    }
    Ok(())
}

fn print_rows(result: &OcrResult) {
    for row in result.rows() {
        let texts = row.iter().map(|f| f.text.as_str()).collect::<Vec<_>>();
        println!("{}", texts.join(" "));
    }
}

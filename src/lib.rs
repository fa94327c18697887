use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use ab_glyph::{FontVec, PxScale};
use canvas::{Canvas, ImageCanvas};
use image::Rgb;
use reqwest::header::CONTENT_TYPE;
use tracing::instrument;

mod annotate;
pub mod canvas;
mod error;
mod layout;
mod reconstruct;
mod result;
pub mod util;

pub use annotate::{annotate, BoxPalette};
pub use error::*;
pub use layout::Fragment;
pub use reconstruct::reconstruct;
pub use result::*;

pub const DEFAULT_ENDPOINT: &str =
    "https://westcentralus.api.cognitive.microsoft.com/vision/v1.0/ocr";

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// DejaVu Sans Mono, used unless [`RenderOptions::font_path`] points elsewhere.
pub(crate) const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");
const BUNDLED_FONT_NAME: &str = "assets/DejaVuSansMono.ttf";

pub const ANNOTATED_SUFFIX: &str = ".annotated.jpg";
pub const RECONSTRUCTED_SUFFIX: &str = ".reconstructed.jpg";

pub struct OcrClientBuilder {
    credential: String,
    endpoint: String,
    language: String,
    detect_orientation: bool,
    timeout: Option<Duration>,
}

impl OcrClientBuilder {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "unk".to_string(),
            detect_orientation: true,
            timeout: None,
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Language hint sent to the service, `unk` lets it auto-detect.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn detect_orientation(mut self, detect_orientation: bool) -> Self {
        self.detect_orientation = detect_orientation;
        self
    }

    /// No timeout unless set: a stalled connection blocks forever.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub fn build(self) -> Result<OcrClient> {
        let http = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ServiceError::Transport)?;
        Ok(OcrClient {
            http,
            credential: self.credential,
            endpoint: self.endpoint,
            language: self.language,
            detect_orientation: self.detect_orientation,
        })
    }
}

/// Blocking client for the remote recognition endpoint.
pub struct OcrClient {
    http: reqwest::blocking::Client,
    credential: String,
    endpoint: String,
    language: String,
    detect_orientation: bool,
}

impl OcrClient {
    /// Submits `image` as an opaque payload and parses the answer. No retries.
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub fn recognize(&self, image: &[u8]) -> Result<OcrResult> {
        let detect_orientation = if self.detect_orientation {
            "true"
        } else {
            "false"
        };
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[
                ("language", self.language.as_str()),
                ("detectOrientation", detect_orientation),
            ])
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(SUBSCRIPTION_KEY_HEADER, &self.credential)
            .body(image.to_vec())
            .send()
            .map_err(ServiceError::Transport)?;

        let status = response.status();
        let body = response.text().map_err(ServiceError::Transport)?;
        log::debug!("OCR service answered {status} with {} bytes", body.len());

        if !status.is_success() {
            return Err(ServiceError::Status { status, body }.into());
        }
        let result =
            serde_json::from_str::<OcrResult>(&body).map_err(|source| ServiceError::Body {
                status,
                body,
                source,
            })?;
        log::debug!("Recognized {} regions", result.regions.len());
        Ok(result)
    }

    /// Recognizes the image at `image_path` and stores the result next to it
    /// as `<stem>.json`. Returns the result and the path written.
    #[instrument(skip(self))]
    pub fn acquire(&self, image_path: &Path) -> Result<(OcrResult, PathBuf)> {
        let image = std::fs::read(image_path).map_err(|err| Error::io(image_path, err))?;
        let result = self.recognize(&image)?;
        let json_path = util::sibling_json_path(image_path);
        util::save_result(&json_path, &result)?;
        log::debug!("Wrote OCR result to {}", json_path.display());
        Ok((result, json_path))
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Must already exist.
    pub out_dir: PathBuf,
    /// `None` uses the font compiled into the crate.
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
    pub boxes: BoxPalette,
    pub background: Rgb<u8>,
    pub ink: Rgb<u8>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            font_path: None,
            font_size: 16.0,
            boxes: BoxPalette::default(),
            background: Rgb([255, 255, 255]),
            ink: Rgb([0, 0, 0]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered {
        annotated: PathBuf,
        reconstructed: PathBuf,
    },
    /// The document has no text angle, nothing was written.
    NoText,
}

pub struct Renderer {
    font: FontVec,
    options: RenderOptions,
}

impl Renderer {
    /// Loads the font up front so a missing asset fails before any image work.
    #[instrument(level = "debug")]
    pub fn new(options: RenderOptions) -> Result<Self> {
        let (path, data) = match &options.font_path {
            Some(path) => {
                let data = std::fs::read(path).map_err(|err| Error::io(path, err))?;
                (path.clone(), data)
            }
            None => (PathBuf::from(BUNDLED_FONT_NAME), BUNDLED_FONT.to_vec()),
        };
        let font = FontVec::try_from_vec(data).map_err(|source| Error::Font { path, source })?;
        Ok(Self { font, options })
    }

    /// Loads the persisted result next to `image_path` and renders it.
    #[instrument(skip(self))]
    pub fn visualize(&self, image_path: &Path) -> Result<RenderOutcome> {
        let result = util::load_result(image_path)?;
        self.render(image_path, &result)
    }

    /// Writes `<stem>.annotated.jpg` and `<stem>.reconstructed.jpg` into the
    /// output directory, or nothing if `result` carries no text angle.
    #[instrument(skip(self, result))]
    pub fn render(&self, image_path: &Path, result: &OcrResult) -> Result<RenderOutcome> {
        let Some(text) = result.recognized() else {
            log::debug!("No text angle in result for {}", image_path.display());
            return Ok(RenderOutcome::NoText);
        };

        let source = image::open(image_path)
            .map_err(|err| Error::image(image_path, err))?
            .to_rgb8();
        let (width, height) = source.dimensions();
        let scale = PxScale::from(self.options.font_size);

        let annotated = util::output_path(&self.options.out_dir, image_path, ANNOTATED_SUFFIX);
        let mut canvas = ImageCanvas::new(source, &self.font, scale);
        annotate(&mut canvas, &text, &self.options.boxes);
        canvas.save_jpeg(&annotated)?;

        let reconstructed =
            util::output_path(&self.options.out_dir, image_path, RECONSTRUCTED_SUFFIX);
        let mut canvas =
            ImageCanvas::blank(width, height, self.options.background, &self.font, scale);
        reconstruct(&mut canvas, &text, self.options.ink);
        canvas.save_jpeg(&reconstructed)?;

        Ok(RenderOutcome::Rendered {
            annotated,
            reconstructed,
        })
    }
}

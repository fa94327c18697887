use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("no OCR result at {}", .0.display())]
    NotFound(PathBuf),

    #[error("malformed OCR result in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoding the source image or encoding an output image failed.
    #[error("image error on {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid font file {}", path.display())]
    Font {
        path: PathBuf,
        #[source]
        source: ab_glyph::InvalidFont,
    },
}

/// Failure talking to the recognition endpoint. Raw status and body are kept
/// for diagnostics.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("OCR request failed")]
    Transport(#[source] reqwest::Error),

    #[error("OCR service answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("OCR service answered {status} with an unreadable body: {body}")]
    Body {
        status: StatusCode,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }
}

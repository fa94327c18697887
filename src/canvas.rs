use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{ImageError, ImageFormat, Rgb, RgbImage};
use imageproc::{
    drawing::{draw_hollow_rect_mut, draw_text_mut, text_size},
    geometric_transformations::{rotate_about_center, Interpolation},
    rect::Rect,
};
use tracing::instrument;

use crate::{Error, Result};

/// The drawing operations the annotation and reconstruction steps need.
pub trait Canvas {
    /// Rotates the whole canvas counter-clockwise by `degrees` around its centre.
    fn rotate(&mut self, degrees: f64);

    /// Outlines the rectangle spanning both corners, inclusive.
    fn draw_rect(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), color: Rgb<u8>);

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Rgb<u8>);

    fn save_jpeg(&self, path: &Path) -> Result<()>;
}

/// [`Canvas`] backed by an in-memory RGB image.
pub struct ImageCanvas<'f> {
    image: RgbImage,
    font: &'f FontVec,
    scale: PxScale,
}

impl<'f> ImageCanvas<'f> {
    pub fn new(image: RgbImage, font: &'f FontVec, scale: PxScale) -> Self {
        Self { image, font, scale }
    }

    pub fn blank(
        width: u32,
        height: u32,
        background: Rgb<u8>,
        font: &'f FontVec,
        scale: PxScale,
    ) -> Self {
        Self::new(RgbImage::from_pixel(width, height, background), font, scale)
    }

    #[cfg(test)]
    pub(crate) fn into_image(self) -> RgbImage {
        self.image
    }
}

impl Canvas for ImageCanvas<'_> {
    fn rotate(&mut self, degrees: f64) {
        if degrees == 0.0 {
            return;
        }
        // imageproc rotates clockwise
        let theta = -(degrees.to_radians() as f32);
        self.image =
            rotate_about_center(&self.image, theta, Interpolation::Nearest, Rgb([0, 0, 0]));
    }

    fn draw_rect(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), color: Rgb<u8>) {
        let (width, height) = self.image.dimensions();
        let (left, right) = min_max(top_left.0, bottom_right.0);
        let (top, bottom) = min_max(top_left.1, bottom_right.1);
        if right < 0 || bottom < 0 || left >= width as i32 || top >= height as i32 {
            log::trace!("Skipping box {top_left:?}..{bottom_right:?} outside the canvas");
            return;
        }
        // Edges clamped to one pixel past the border stay invisible.
        let (left, right) = (left.max(-1), right.min(width as i32));
        let (top, bottom) = (top.max(-1), bottom.min(height as i32));
        let rect = Rect::at(left, top).of_size(
            right.abs_diff(left) + 1,
            bottom.abs_diff(top) + 1,
        );
        draw_hollow_rect_mut(&mut self.image, rect, color);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        let (width, height) = self.image.dimensions();
        let (text_width, text_height) = text_size(self.scale, self.font, text);
        let margin = self.scale.y.ceil() as i64;
        let (x_wide, y_wide) = (x as i64, y as i64);
        if x_wide >= width as i64
            || y_wide >= height as i64
            || x_wide + text_width as i64 + margin < 0
            || y_wide + text_height as i64 + margin < 0
        {
            log::trace!("Skipping text {text:?} at ({x}, {y}) outside the canvas");
            return;
        }
        draw_text_mut(&mut self.image, color, x, y, self.scale, self.font, text);
    }

    #[instrument(level = "debug", skip(self))]
    fn save_jpeg(&self, path: &Path) -> Result<()> {
        self.image
            .save_with_format(path, ImageFormat::Jpeg)
            .map_err(|err| match err {
                ImageError::IoError(source) => Error::io(path, source),
                other => Error::image(path, other),
            })
    }
}

fn min_max(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Op {
        Rotate(f64),
        Rect((i32, i32), (i32, i32), Rgb<u8>),
        Text(i32, i32, String, Rgb<u8>),
    }

    /// Records every call instead of touching pixels.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingCanvas {
        pub(crate) ops: Vec<Op>,
    }

    impl Canvas for RecordingCanvas {
        fn rotate(&mut self, degrees: f64) {
            self.ops.push(Op::Rotate(degrees));
        }

        fn draw_rect(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), color: Rgb<u8>) {
            self.ops.push(Op::Rect(top_left, bottom_right, color));
        }

        fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Rgb<u8>) {
            self.ops.push(Op::Text(x, y, text.to_string(), color));
        }

        fn save_jpeg(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }
}

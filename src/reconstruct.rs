use image::Rgb;
use tracing::instrument;

use crate::{canvas::Canvas, RecognizedText};

/// Writes every recognized word at the top-left corner of its box.
///
/// Words are drawn in document order, so later words paint over earlier ones
/// where they overlap.
#[instrument(level = "debug", skip(canvas, text))]
pub fn reconstruct(canvas: &mut impl Canvas, text: &RecognizedText<'_>, ink: Rgb<u8>) {
    let mut count = 0usize;
    for word in text.words() {
        let (x, y) = word.bounding_box.origin();
        canvas.draw_text(x, y, &word.text, ink);
        count += 1;
    }
    log::trace!("Reconstructed {count} words");
}

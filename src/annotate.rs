use image::Rgb;
use tracing::instrument;

use crate::{canvas::Canvas, BoundingBox, RecognizedText};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxPalette {
    pub region: Rgb<u8>,
    pub line: Rgb<u8>,
    pub word: Rgb<u8>,
}

impl Default for BoxPalette {
    fn default() -> Self {
        Self {
            region: Rgb([255, 255, 255]),
            line: Rgb([255, 0, 0]),
            word: Rgb([0, 255, 0]),
        }
    }
}

/// Rotates the canvas by the text angle, then outlines every region, line and
/// word box.
///
/// Boxes are not re-projected through the rotation: they stay in the
/// coordinates of the unrotated image, so larger angles drift visibly.
#[instrument(level = "debug", skip(canvas, text), fields(angle = text.text_angle))]
pub fn annotate(canvas: &mut impl Canvas, text: &RecognizedText<'_>, palette: &BoxPalette) {
    canvas.rotate(text.text_angle);

    let mut outline = |bbox: &BoundingBox, color| {
        let (top_left, bottom_right) = bbox.corners();
        canvas.draw_rect(top_left, bottom_right, color);
    };

    for region in text.regions {
        outline(&region.bounding_box, palette.region);
        for line in &region.lines {
            outline(&line.bounding_box, palette.line);
            for word in &line.words {
                outline(&word.bounding_box, palette.word);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        canvas::fake::{Op, RecordingCanvas},
        OcrResult,
    };

    #[test]
    fn rotates_first_then_draws_nested_boxes() {
        let result: OcrResult = serde_json::from_str(
            r#"{"textAngle": -2.5, "regions": [{"boundingBox": "10,20,30,40", "lines": [
                {"boundingBox": "11,21,28,10", "words": [
                    {"boundingBox": "11,21,10,10", "text": "ab"},
                    {"boundingBox": "25,21,10,10", "text": "cd"}
                ]}
            ]}]}"#,
        )
        .unwrap();
        let palette = BoxPalette::default();
        let mut canvas = RecordingCanvas::default();

        annotate(&mut canvas, &result.recognized().unwrap(), &palette);

        assert_eq!(
            canvas.ops,
            vec![
                Op::Rotate(-2.5),
                Op::Rect((10, 20), (40, 60), palette.region),
                Op::Rect((11, 21), (39, 31), palette.line),
                Op::Rect((11, 21), (21, 31), palette.word),
                Op::Rect((25, 21), (35, 31), palette.word),
            ]
        );
    }

    #[test]
    fn empty_document_only_rotates() {
        let result: OcrResult =
            serde_json::from_str(r#"{"textAngle": 0.0, "regions": []}"#).unwrap();
        let mut canvas = RecordingCanvas::default();
        annotate(
            &mut canvas,
            &result.recognized().unwrap(),
            &BoxPalette::default(),
        );
        assert_eq!(canvas.ops, vec![Op::Rotate(0.0)]);
    }
}

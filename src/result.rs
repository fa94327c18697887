use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Root of a recognition response, persisted verbatim next to the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    /// Absent when the service found no usable text orientation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_angle: Option<f64>,
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Members we don't interpret (`language`, `orientation`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub text: String,
}

/// Axis aligned box in the coordinate space of the unrotated source image.
///
/// Serialized as `"x,y,width,height"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundingBoxError {
    #[error("expected 4 comma separated values, found {0}")]
    TokenCount(usize),
    #[error("invalid integer {token:?} in bounding box")]
    NotAnInteger {
        token: String,
        #[source]
        source: ParseIntError,
    },
}

/// An [`OcrResult`] known to carry a text angle, i.e. something worth drawing.
#[derive(Debug, Clone, Copy)]
pub struct RecognizedText<'a> {
    pub text_angle: f64,
    pub regions: &'a [Region],
}

impl OcrResult {
    pub fn recognized(&self) -> Option<RecognizedText<'_>> {
        self.text_angle.map(|text_angle| RecognizedText {
            text_angle,
            regions: &self.regions,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.regions.iter().flat_map(|region| region.lines.iter())
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.lines().flat_map(|line| line.words.iter())
    }
}

impl<'a> RecognizedText<'a> {
    /// Every word in document order: regions, then lines, then words.
    pub fn words(&self) -> impl Iterator<Item = &'a Word> {
        self.regions
            .iter()
            .flat_map(|region| region.lines.iter())
            .flat_map(|line| line.words.iter())
    }
}

impl Line {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|word| word.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Top-left and bottom-right corners, `(x, y)` and `(x + width, y + height)`.
    pub fn corners(&self) -> ((i32, i32), (i32, i32)) {
        (
            (self.x, self.y),
            (
                self.x.saturating_add(self.width),
                self.y.saturating_add(self.height),
            ),
        )
    }
}

impl FromStr for BoundingBox {
    type Err = BoundingBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = s.split(',').collect::<Vec<_>>();
        let [x, y, width, height] = tokens[..] else {
            return Err(BoundingBoxError::TokenCount(tokens.len()));
        };
        let parse = |token: &str| {
            token
                .trim()
                .parse::<i32>()
                .map_err(|source| BoundingBoxError::NotAnInteger {
                    token: token.to_string(),
                    source,
                })
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BoundingBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = r#"{"textAngle": 0.0, "regions": [{"boundingBox": "0,0,100,20", "lines": [{"boundingBox": "0,0,100,20", "words": [{"boundingBox": "0,0,50,20", "text": "Hello"}]}]}]}"#;

    #[test]
    fn parses_bounding_box() {
        let bbox: BoundingBox = "10,20,30,40".parse().unwrap();
        assert_eq!(bbox, BoundingBox::new(10, 20, 30, 40));
        assert_eq!(bbox.corners(), ((10, 20), (40, 60)));
        assert_eq!(bbox.to_string(), "10,20,30,40");
    }

    #[test]
    fn rejects_wrong_token_count() {
        assert_eq!(
            "10,20,30".parse::<BoundingBox>(),
            Err(BoundingBoxError::TokenCount(3))
        );
        assert_eq!(
            "10,20,30,40,50".parse::<BoundingBox>(),
            Err(BoundingBoxError::TokenCount(5))
        );
        assert_eq!(
            "".parse::<BoundingBox>(),
            Err(BoundingBoxError::TokenCount(1))
        );
    }

    #[test]
    fn rejects_non_integer_tokens() {
        for input in ["a,20,30,40", "10,20,30,4.5", "10,,30,40"] {
            let err = input.parse::<BoundingBox>().unwrap_err();
            assert!(
                matches!(err, BoundingBoxError::NotAnInteger { .. }),
                "{input}: {err:?}"
            );
        }
    }

    #[test]
    fn malformed_box_fails_document_parse() {
        let doc = HELLO.replace("0,0,50,20", "0,0,50");
        assert!(serde_json::from_str::<OcrResult>(&doc).is_err());
    }

    #[test]
    fn deserializes_nested_document() {
        let result: OcrResult = serde_json::from_str(HELLO).unwrap();
        assert_eq!(result.text_angle, Some(0.0));
        assert_eq!(result.regions.len(), 1);
        let line = &result.regions[0].lines[0];
        assert_eq!(line.bounding_box, BoundingBox::new(0, 0, 100, 20));
        assert_eq!(line.words[0].text, "Hello");
        assert!(result.recognized().is_some());
    }

    #[test]
    fn missing_or_null_angle_is_not_recognized() {
        let missing: OcrResult = serde_json::from_str(r#"{"language": "unk"}"#).unwrap();
        assert!(missing.recognized().is_none());
        assert!(missing.regions.is_empty());

        let null: OcrResult =
            serde_json::from_str(r#"{"textAngle": null, "regions": []}"#).unwrap();
        assert!(null.recognized().is_none());
    }

    #[test]
    fn keeps_unknown_members_and_omits_absent_angle() {
        let result: OcrResult =
            serde_json::from_str(r#"{"language": "de", "orientation": "Up", "regions": []}"#)
                .unwrap();
        assert_eq!(result.extra["language"], "de");

        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("textAngle").is_none());
        assert_eq!(value["orientation"], "Up");
    }

    #[test]
    fn line_text_joins_words() {
        let line: Line = serde_json::from_str(
            r#"{"boundingBox": "0,0,1,1", "words": [
                {"boundingBox": "0,0,1,1", "text": "Graf"},
                {"boundingBox": "0,0,1,1", "text": "von"},
                {"boundingBox": "0,0,1,1", "text": "Krolock"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(line.text(), "Graf von Krolock");
    }

    #[test]
    fn words_follow_document_order() {
        let doc = r#"{"textAngle": 1.5, "regions": [
            {"boundingBox": "0,0,1,1", "lines": [
                {"boundingBox": "0,0,1,1", "words": [{"boundingBox": "0,0,1,1", "text": "a"}, {"boundingBox": "0,0,1,1", "text": "b"}]},
                {"boundingBox": "0,0,1,1", "words": [{"boundingBox": "0,0,1,1", "text": "c"}]}
            ]},
            {"boundingBox": "0,0,1,1", "lines": [
                {"boundingBox": "0,0,1,1", "words": [{"boundingBox": "0,0,1,1", "text": "d"}]}
            ]}
        ]}"#;
        let result: OcrResult = serde_json::from_str(doc).unwrap();
        let recognized = result.recognized().unwrap();
        let texts = recognized.words().map(|w| w.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, ["a", "b", "c", "d"]);
        assert_eq!(result.words().count(), 4);
        assert_eq!(result.lines().count(), 3);
    }
}

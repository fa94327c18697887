use std::collections::BTreeMap;

use crate::{BoundingBox, Line, OcrResult};

/// A recognized line reduced to its box and its words joined by spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub bounding_box: BoundingBox,
    pub text: String,
}

impl From<&Line> for Fragment {
    fn from(line: &Line) -> Self {
        Self {
            bounding_box: line.bounding_box,
            text: line.text(),
        }
    }
}

impl OcrResult {
    /// Groups every line of the document into visual rows, top to bottom,
    /// each row ordered left to right.
    ///
    /// Fragments fall into bands of the average fragment height. A fragment
    /// opening a new band joins the band above instead when that band holds a
    /// single fragment no more than half an average height away, so a row
    /// straddling a band boundary is not split.
    pub fn rows(&self) -> Vec<Vec<Fragment>> {
        let mut fragments = self.lines().map(Fragment::from).collect::<Vec<_>>();
        if fragments.is_empty() {
            return Vec::new();
        }

        let total_height: f64 = fragments
            .iter()
            .map(|f| f64::from(f.bounding_box.height))
            .sum();
        // Degenerate heights would put every fragment in its own band.
        let average_height = (total_height / fragments.len() as f64).max(1.0);
        log::trace!(
            "Grouping {} fragments into rows, average height {average_height}",
            fragments.len()
        );

        fragments.sort_by_key(|f| f.bounding_box.y);

        let mut bands: BTreeMap<i64, Vec<Fragment>> = BTreeMap::new();
        for fragment in fragments {
            let y = f64::from(fragment.bounding_box.y);
            let mut band = (y / average_height).floor() as i64;
            if !bands.contains_key(&band) && band >= 1 {
                if let Some([single]) = bands.get(&(band - 1)).map(Vec::as_slice) {
                    let gap = (f64::from(single.bounding_box.y) - y).abs();
                    if gap <= average_height / 2.0 {
                        band -= 1;
                    }
                }
            }
            bands.entry(band).or_default().push(fragment);
        }

        bands
            .into_values()
            .map(|mut row| {
                row.sort_by_key(|f| f.bounding_box.x);
                row
            })
            .collect()
    }
}

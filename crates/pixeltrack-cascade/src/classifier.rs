//! Pre-trained boosted cascade and its flat numeric layout.
//!
//! The flat layout is
//!
//! ```text
//! [min_width, min_height,
//!  stage_threshold, node_count,
//!    (tilted, rect_count, (left, top, width, height, weight) * rect_count,
//!     node_threshold, left_value, right_value) * node_count,
//!  ...next stage...]
//! ```

use crate::error::{ClassifierFormatError, ClassifierIoError};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Weighted rectangle of a Haar-like feature, in classifier window units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

/// Weak classifier: a weighted rectangle sum compared against a threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Evaluate `rects` on the 45° tilted table.
    pub tilted: bool,
    pub rects: Vec<FeatureRect>,
    pub threshold: f64,
    /// Added to the stage sum when the normalised feature is below threshold.
    pub left: f64,
    pub right: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub threshold: f64,
    pub nodes: Vec<Node>,
}

/// Cascade of stages with the base detection window size.
///
/// Stage order is significant: a window is rejected by the first stage whose
/// sum falls below its threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CascadeClassifier {
    pub min_width: u32,
    pub min_height: u32,
    pub stages: Vec<Stage>,
}

struct Cursor<'a> {
    data: &'a [f64],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self, field: &'static str) -> Result<f64, ClassifierFormatError> {
        let v = self
            .data
            .get(self.pos)
            .copied()
            .ok_or(ClassifierFormatError::Truncated {
                offset: self.pos,
                field,
            })?;
        self.pos += 1;
        Ok(v)
    }

    fn count(&mut self, field: &'static str) -> Result<usize, ClassifierFormatError> {
        let offset = self.pos;
        let value = self.next(field)?;
        // Each counted item needs at least one more value, so the count is
        // bounded by what is left.
        let remaining = (self.data.len() - self.pos) as f64;
        if value < 0.0 || value.fract() != 0.0 || value > remaining {
            return Err(ClassifierFormatError::InvalidCount {
                offset,
                field,
                value,
            });
        }
        Ok(value as usize)
    }

    fn done(&self) -> bool {
        self.pos >= self.data.len()
    }
}

impl CascadeClassifier {
    /// Parse the flat numeric layout.
    pub fn from_flat(data: &[f64]) -> Result<Self, ClassifierFormatError> {
        let mut cur = Cursor { data, pos: 0 };
        let width = cur.next("min_width")?;
        let height = cur.next("min_height")?;
        if !(width >= 1.0 && height >= 1.0 && width.is_finite() && height.is_finite()) {
            return Err(ClassifierFormatError::InvalidWindow { width, height });
        }

        let mut stages = Vec::new();
        while !cur.done() {
            let threshold = cur.next("stage_threshold")?;
            let node_count = cur.count("node_count")?;
            let mut nodes = Vec::with_capacity(node_count);
            for _ in 0..node_count {
                let tilted = cur.next("node_tilted")? != 0.0;
                let rect_count = cur.count("rect_count")?;
                let mut rects = Vec::with_capacity(rect_count);
                for _ in 0..rect_count {
                    rects.push(FeatureRect {
                        left: cur.next("rect_left")?,
                        top: cur.next("rect_top")?,
                        width: cur.next("rect_width")?,
                        height: cur.next("rect_height")?,
                        weight: cur.next("rect_weight")?,
                    });
                }
                nodes.push(Node {
                    tilted,
                    rects,
                    threshold: cur.next("node_threshold")?,
                    left: cur.next("node_left")?,
                    right: cur.next("node_right")?,
                });
            }
            stages.push(Stage { threshold, nodes });
        }

        Ok(Self {
            min_width: width as u32,
            min_height: height as u32,
            stages,
        })
    }

    /// Encode back into the flat layout.
    pub fn to_flat(&self) -> Vec<f64> {
        let mut out = vec![self.min_width as f64, self.min_height as f64];
        for stage in &self.stages {
            out.push(stage.threshold);
            out.push(stage.nodes.len() as f64);
            for node in &stage.nodes {
                out.push(if node.tilted { 1.0 } else { 0.0 });
                out.push(node.rects.len() as f64);
                for r in &node.rects {
                    out.extend_from_slice(&[r.left, r.top, r.width, r.height, r.weight]);
                }
                out.extend_from_slice(&[node.threshold, node.left, node.right]);
            }
        }
        out
    }

    /// Load a classifier stored as a JSON array in the flat layout.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ClassifierIoError> {
        let raw = fs::read_to_string(path)?;
        let flat: Vec<f64> = serde_json::from_str(&raw)?;
        Ok(Self::from_flat(&flat)?)
    }

    /// Write this classifier as a JSON array in the flat layout.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ClassifierIoError> {
        fs::write(path, serde_json::to_string(&self.to_flat())?)?;
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.stages.iter().map(|s| s.nodes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stage_flat() -> Vec<f64> {
        vec![
            20.0, 24.0, // window
            -1.5, 1.0, // stage 0: threshold, one node
            0.0, 2.0, 2.0, 3.0, 16.0, 6.0, -1.0, 2.0, 6.0, 16.0, 3.0, 2.0, //
            0.004, 0.3, -0.9, // node threshold / left / right
            -1.2, 1.0, // stage 1
            1.0, 1.0, 4.0, 2.0, 8.0, 4.0, 1.0, //
            -0.01, 0.5, -0.5,
        ]
    }

    #[test]
    fn parses_stages_and_nodes() {
        let c = CascadeClassifier::from_flat(&two_stage_flat()).expect("parse");
        assert_eq!((c.min_width, c.min_height), (20, 24));
        assert_eq!(c.stages.len(), 2);
        assert_eq!(c.stages[0].nodes[0].rects.len(), 2);
        assert!(!c.stages[0].nodes[0].tilted);
        assert!(c.stages[1].nodes[0].tilted);
        assert_eq!(c.stages[1].nodes[0].rects[0].weight, 1.0);
        assert_eq!(c.stages[0].nodes[0].right, -0.9);
        assert_eq!(c.node_count(), 2);
    }

    #[test]
    fn flat_layout_is_stable() {
        let flat = two_stage_flat();
        let c = CascadeClassifier::from_flat(&flat).expect("parse");
        assert_eq!(c.to_flat(), flat);
    }

    #[test]
    fn truncated_data_is_reported() {
        let mut flat = two_stage_flat();
        flat.pop();
        let err = CascadeClassifier::from_flat(&flat).unwrap_err();
        assert_eq!(
            err,
            ClassifierFormatError::Truncated {
                offset: flat.len(),
                field: "node_right"
            }
        );
    }

    #[test]
    fn rejects_bad_window_and_counts() {
        assert!(matches!(
            CascadeClassifier::from_flat(&[0.0, 10.0]),
            Err(ClassifierFormatError::InvalidWindow { .. })
        ));
        assert!(matches!(
            CascadeClassifier::from_flat(&[10.0, 10.0, 0.5, -1.0]),
            Err(ClassifierFormatError::InvalidCount { offset: 3, .. })
        ));
        assert!(matches!(
            CascadeClassifier::from_flat(&[10.0, 10.0, 0.5, 1e9, 0.0]),
            Err(ClassifierFormatError::InvalidCount { .. })
        ));
    }

    #[test]
    fn json_file_round_trip() {
        let c = CascadeClassifier::from_flat(&two_stage_flat()).expect("parse");
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cascade.json");
        c.write_json(&path).expect("write");
        assert_eq!(CascadeClassifier::load_json(&path).expect("load"), c);
    }
}

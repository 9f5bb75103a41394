//! Connected-component color blobs.

use crate::registry::{ColorPredicate, ColorRegistry, PixelSample};
use log::trace;
use pixeltrack_core::{FrameError, Rect, RgbaImageView, Tracker, WidthCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum ColorError {
    #[error("unknown color {name:?}")]
    UnknownColor { name: String },
    #[error("no colors requested")]
    NoColors,
    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorParams {
    /// Registered color names, tracked in this order.
    pub colors: Vec<String>,
    /// Smallest accepted box side.
    pub min_dimension: u32,
    /// Largest accepted box side, unbounded when `None`.
    pub max_dimension: Option<u32>,
    /// Matching pixels a component needs to produce a box.
    pub min_group_size: usize,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            colors: vec!["magenta".to_string()],
            min_dimension: 20,
            max_dimension: None,
            min_group_size: 30,
        }
    }
}

impl ColorParams {
    fn accepts(&self, rect: &Rect) -> bool {
        let min = self.min_dimension as i64;
        let max = self.max_dimension.map_or(i64::MAX, |m| m as i64);
        let (w, h) = (rect.width as i64, rect.height as i64);
        w >= min && h >= min && w <= max && h <= max
    }
}

/// Bounding box of one color blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRegion {
    #[serde(flatten)]
    pub rect: Rect,
    pub color: String,
}

/// `(dx, dy)` of the eight neighbours plus their flat pixel offset.
type Neighbours = [(isize, isize, isize); 8];

fn neighbours_for_width(width: usize) -> Neighbours {
    let w = width as isize;
    [
        (0, -1, -w),
        (1, -1, -w + 1),
        (1, 0, 1),
        (1, 1, w + 1),
        (0, 1, w),
        (-1, 1, w - 1),
        (-1, 0, -1),
        (-1, -1, -w - 1),
    ]
}

/// Tracks blobs of one or more registered colors.
#[derive(Debug)]
pub struct ColorTracker {
    params: ColorParams,
    registry: Arc<ColorRegistry>,
    neighbours: WidthCache<Neighbours>,
}

impl ColorTracker {
    /// Fails when no colors are requested or one is not in `registry`.
    pub fn new(params: ColorParams, registry: Arc<ColorRegistry>) -> Result<Self, ColorError> {
        if params.colors.is_empty() {
            return Err(ColorError::NoColors);
        }
        if let Some(name) = params.colors.iter().find(|c| !registry.contains(c)) {
            return Err(ColorError::UnknownColor { name: name.clone() });
        }
        Ok(Self {
            params,
            registry,
            neighbours: WidthCache::new(),
        })
    }

    /// Tracker over the built-in colors.
    pub fn with_builtins(params: ColorParams) -> Result<Self, ColorError> {
        Self::new(params, Arc::new(ColorRegistry::with_builtins()))
    }

    pub fn params(&self) -> &ColorParams {
        &self.params
    }

    pub fn registry(&self) -> &ColorRegistry {
        &self.registry
    }

    /// Merged boxes for a single color, before results of other colors are appended.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn track_color(
        &self,
        frame: &RgbaImageView<'_>,
        color: &str,
    ) -> Result<Vec<ColorRegion>, ColorError> {
        let predicate = self
            .registry
            .get(color)
            .ok_or_else(|| ColorError::UnknownColor {
                name: color.to_string(),
            })?;
        let boxes = self.components(frame, predicate);
        trace!("{}: {} components", color, boxes.len());
        let merged = merge_regions(boxes, &self.params);
        Ok(merged
            .into_iter()
            .map(|rect| ColorRegion {
                rect,
                color: color.to_string(),
            })
            .collect())
    }

    /// Bounding boxes of every component with enough matching pixels,
    /// in seed order.
    fn components(&self, frame: &RgbaImageView<'_>, predicate: &ColorPredicate) -> Vec<Rect> {
        let (width, height) = (frame.width, frame.height);
        let neighbours = self.neighbours.get_or_insert_with(width, neighbours_for_width);
        let mut marked = vec![false; width * height];
        let mut stack: Vec<usize> = Vec::new();
        let mut boxes = Vec::new();

        for seed in 0..width * height {
            if marked[seed] {
                continue;
            }
            marked[seed] = true;
            stack.push(seed);
            let mut count = 0usize;
            let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
            let (mut max_x, mut max_y) = (0usize, 0usize);

            while let Some(p) = stack.pop() {
                let (x, y) = (p % width, p / width);
                let index = p * RgbaImageView::CHANNELS;
                let [r, g, b, a] = frame.rgba(x, y);
                let sample = PixelSample {
                    r,
                    g,
                    b,
                    a,
                    index,
                    x,
                    y,
                };
                if !predicate(&sample) {
                    continue;
                }
                count += 1;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);

                for &(dx, dy, off) in &neighbours {
                    let nx = x as isize + dx;
                    let ny = y as isize + dy;
                    if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                        continue;
                    }
                    let q = (p as isize + off) as usize;
                    if !marked[q] {
                        marked[q] = true;
                        stack.push(q);
                    }
                }
            }

            if count > 0 && count >= self.params.min_group_size {
                boxes.push(Rect::new(
                    min_x as i32,
                    min_y as i32,
                    (max_x - min_x) as i32,
                    (max_y - min_y) as i32,
                ));
            }
        }
        boxes
    }
}

/// Single forward sweep: each box is absorbed into the first later box it
/// touches; boxes with no later partner are kept when their size fits
/// `params`.
///
/// Grouping depends on input order. A kept box is never compared again with
/// boxes that grow later in the sweep.
pub fn merge_regions(mut boxes: Vec<Rect>, params: &ColorParams) -> Vec<Rect> {
    let mut out = Vec::new();
    for r in 0..boxes.len() {
        let current = boxes[r];
        let partner = (r + 1..boxes.len()).find(|&s| current.intersects(&boxes[s]));
        match partner {
            Some(s) => boxes[s] = current.union(&boxes[s]),
            None if params.accepts(&current) => out.push(current),
            None => {}
        }
    }
    out
}

impl Tracker for ColorTracker {
    type Output = ColorRegion;
    type Error = ColorError;

    /// Regions for every requested color, concatenated in color order.
    fn track(&self, frame: &RgbaImageView<'_>) -> Result<Vec<ColorRegion>, ColorError> {
        let mut out = Vec::new();
        for color in &self.params.colors {
            out.extend(self.track_color(frame, color)?);
        }
        Ok(out)
    }
}

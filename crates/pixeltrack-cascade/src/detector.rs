//! Multi-scale sliding-window scan with cascade evaluation.

use crate::classifier::{CascadeClassifier, Node, Stage};
use crate::error::CascadeError;
use crate::merge::merge_rectangles;
use log::debug;
use pixeltrack_core::{
    Detection, GrayImageView, IntegralImageBuilder, IntegralImages, Rect, RgbaImageView,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Scan parameters for the cascade detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolaJonesParams {
    /// Scale of the classifier window before the first growth step.
    pub initial_scale: f32,
    /// Window growth per scale level; must exceed 1.
    pub scale_factor: f32,
    /// Window stride relative to the current scale.
    pub step_size: f32,
    /// Minimum mean Sobel magnitude (normalised to `[0, 1]`) a window needs
    /// before the cascade runs. `0` disables the pre-filter.
    pub edges_density: f32,
}

impl Default for ViolaJonesParams {
    fn default() -> Self {
        Self {
            initial_scale: 1.0,
            scale_factor: 1.25,
            step_size: 1.5,
            edges_density: 0.2,
        }
    }
}

impl ViolaJonesParams {
    /// Reject settings that would not terminate or would scan nothing.
    pub fn validate(&self) -> Result<(), CascadeError> {
        if !(self.scale_factor > 1.0 && self.scale_factor.is_finite()) {
            return Err(CascadeError::NonTerminatingScale {
                scale_factor: self.scale_factor,
            });
        }
        if !(self.initial_scale > 0.0 && self.initial_scale.is_finite()) {
            return Err(CascadeError::InvalidInitialScale(self.initial_scale));
        }
        if !(self.step_size > 0.0 && self.step_size.is_finite()) {
            return Err(CascadeError::InvalidStepSize(self.step_size));
        }
        if !(0.0..=1.0).contains(&self.edges_density) {
            return Err(CascadeError::InvalidEdgesDensity(self.edges_density));
        }
        Ok(())
    }

    pub fn uses_edges(&self) -> bool {
        self.edges_density > 0.0
    }
}

/// Check a working-to-source factor as produced by `ScaleAdvisor`.
pub(crate) fn check_coordinate_scale(scale: f32) -> Result<f32, CascadeError> {
    if scale > 0.0 && scale <= 1.0 {
        Ok(scale)
    } else {
        Err(CascadeError::InvalidCoordinateScale(scale))
    }
}

/// Detect objects in an RGBA frame and merge overlapping hits.
///
/// `coordinate_scale` is the factor the frame was reduced by; merged
/// rectangles are divided by it to land in source coordinates.
pub fn detect(
    frame: &RgbaImageView<'_>,
    params: &ViolaJonesParams,
    classifier: &CascadeClassifier,
    coordinate_scale: f32,
) -> Result<Vec<Detection>, CascadeError> {
    params.validate()?;
    check_coordinate_scale(coordinate_scale)?;
    let gray = frame.to_gray();
    let integral = IntegralImageBuilder::new(params.uses_edges()).build(&gray.view());
    Ok(merge_rectangles(
        &scan(&integral, params, classifier)?,
        coordinate_scale,
    ))
}

/// Grayscale variant of [`detect`].
pub fn detect_gray(
    gray: &GrayImageView<'_>,
    params: &ViolaJonesParams,
    classifier: &CascadeClassifier,
    coordinate_scale: f32,
) -> Result<Vec<Detection>, CascadeError> {
    params.validate()?;
    check_coordinate_scale(coordinate_scale)?;
    let integral = IntegralImageBuilder::new(params.uses_edges()).build(gray);
    Ok(merge_rectangles(
        &scan(&integral, params, classifier)?,
        coordinate_scale,
    ))
}

/// Every window accepted by the cascade, before merging.
///
/// `params` are validated first, so a scale factor that would never grow the
/// window fails before any window is visited. The edge pre-filter is skipped
/// when `integral` carries no edge table.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(width = integral.width, height = integral.height, stages = classifier.stages.len()))
)]
pub fn scan(
    integral: &IntegralImages,
    params: &ViolaJonesParams,
    classifier: &CascadeClassifier,
) -> Result<Vec<Rect>, CascadeError> {
    params.validate()?;
    let (width, height) = (integral.width, integral.height);
    let min_w = classifier.min_width as f64;
    let min_h = classifier.min_height as f64;
    let factor = params.scale_factor as f64;
    let step_size = params.step_size as f64;
    let edges = if params.uses_edges() {
        integral.edges.as_deref()
    } else {
        None
    };

    let mut hits = Vec::new();
    let mut scale = params.initial_scale as f64 * factor;
    let mut block_w = (scale * min_w) as usize;
    let mut block_h = (scale * min_h) as usize;

    while block_w < width && block_h < height {
        if block_w > 0 && block_h > 0 {
            let step = ((scale * step_size + 0.5) as usize).max(1);
            let before = hits.len();
            for i in (0..height - block_h).step_by(step) {
                for j in (0..width - block_w).step_by(step) {
                    if let Some(edges) = edges {
                        let density = integral.rect_sum(edges, j, i, j + block_w, i + block_h)
                            as f64
                            / (block_w * block_h * 255) as f64;
                        if density < params.edges_density as f64 {
                            continue;
                        }
                    }
                    let window = Window::new(integral, j, i, block_w, block_h, scale);
                    if window.accepts(&classifier.stages) {
                        hits.push(Rect::new(j as i32, i as i32, block_w as i32, block_h as i32));
                    }
                }
            }
            debug!(
                "scale {:.3}: window {}x{} step {} -> {} hits",
                scale,
                block_w,
                block_h,
                step,
                hits.len() - before
            );
        }
        scale *= factor;
        block_w = (scale * min_w) as usize;
        block_h = (scale * min_h) as usize;
    }
    Ok(hits)
}

/// One candidate window with its intensity normalisation.
pub struct Window<'a> {
    integral: &'a IntegralImages,
    x: usize,
    y: usize,
    scale: f64,
    inverse_area: f64,
    std_dev: f64,
}

impl<'a> Window<'a> {
    pub fn new(
        integral: &'a IntegralImages,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        scale: f64,
    ) -> Self {
        let inverse_area = 1.0 / (width * height) as f64;
        let (x2, y2) = (x + width, y + height);
        let mean = integral.rect_sum(&integral.sum, x, y, x2, y2) as f64 * inverse_area;
        let variance =
            integral.rect_sum(&integral.square, x, y, x2, y2) as f64 * inverse_area - mean * mean;
        let std_dev = if variance > 0.0 { variance.sqrt() } else { 1.0 };
        Self {
            integral,
            x,
            y,
            scale,
            inverse_area,
            std_dev,
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Runs stages in order and stops at the first rejection.
    pub fn accepts(&self, stages: &[Stage]) -> bool {
        stages.iter().all(|s| self.stage_sum(s) >= s.threshold)
    }

    pub fn stage_sum(&self, stage: &Stage) -> f64 {
        stage
            .nodes
            .iter()
            .map(|node| {
                if self.feature_sum(node) * self.inverse_area < node.threshold * self.std_dev {
                    node.left
                } else {
                    node.right
                }
            })
            .sum()
    }

    /// Weighted rectangle sum of a node at this window's position and scale.
    pub fn feature_sum(&self, node: &Node) -> f64 {
        let width = self.integral.width as isize;
        let s = self.scale;
        let mut total = 0.0;
        for r in &node.rects {
            let left = (self.x as f64 + r.left * s + 0.5) as isize;
            let top = (self.y as f64 + r.top * s + 0.5) as isize;
            let w = (r.width * s + 0.5) as isize;
            let h = (r.height * s + 0.5) as isize;

            let sum = if node.tilted {
                let t = &self.integral.tilted;
                let a = (left - h + w) + (top + w + h - 1) * width;
                let b = left + (top - 1) * width;
                let c = (left - h) + (top + h - 1) * width;
                let d = (left + w) + (top + w - 1) * width;
                IntegralImages::at(t, a) + IntegralImages::at(t, b)
                    - IntegralImages::at(t, c)
                    - IntegralImages::at(t, d)
            } else {
                let t = &self.integral.sum;
                let a = top * width + left;
                let b = a + w;
                let c = a + h * width;
                let d = c + w;
                IntegralImages::at(t, a) - IntegralImages::at(t, b) - IntegralImages::at(t, c)
                    + IntegralImages::at(t, d)
            };
            total += sum as f64 * r.weight;
        }
        total
    }
}

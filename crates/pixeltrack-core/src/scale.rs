//! Working-resolution advice from frame area.

use serde::{Deserialize, Serialize};

/// Frame area (in pixels) that is processed at full resolution.
pub const PIXEL_THRESHOLD: f64 = 50_000.0;

/// Smallest factor the advisor hands out.
pub const MIN_SCALE: f32 = 0.1;

/// Resolution-reduction factor for a `width × height` frame.
///
/// `1 / sqrt(area / PIXEL_THRESHOLD)`, never above `1.0`, rounded to the
/// nearest tenth and kept at or above [`MIN_SCALE`].
pub fn scale_for_frame(width: usize, height: usize) -> f32 {
    let area = width as f64 * height as f64;
    if area <= PIXEL_THRESHOLD {
        return 1.0;
    }
    let ratio = (1.0 / (area / PIXEL_THRESHOLD).sqrt()).min(1.0);
    let quantized = (ratio * 10.0).round() / 10.0;
    (quantized as f32).clamp(MIN_SCALE, 1.0)
}

/// Holds the scale factor shared between frames until the next adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleAdvisor {
    factor: f32,
}

impl Default for ScaleAdvisor {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

impl ScaleAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current factor, `1.0` until the first adjustment.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Recompute the factor for a frame size and return it.
    pub fn adjust_scale(&mut self, width: usize, height: usize) -> f32 {
        let next = scale_for_frame(width, height);
        if next != self.factor {
            log::debug!(
                "scale factor {} -> {} for {}x{} frame",
                self.factor,
                next,
                width,
                height
            );
        }
        self.factor = next;
        next
    }

    /// Working-resolution dimensions for a source frame at the current factor.
    pub fn working_size(&self, width: usize, height: usize) -> (usize, usize) {
        let s = self.factor as f64;
        (
            ((width as f64 * s).round() as usize).max(1),
            ((height as f64 * s).round() as usize).max(1),
        )
    }
}

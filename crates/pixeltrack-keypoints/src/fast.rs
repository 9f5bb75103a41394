//! FAST segment-test corner detector.
//!
//! A pixel is a corner when nine contiguous pixels on the radius-3 Bresenham
//! circle around it are all brighter, or all darker, than the center by more
//! than the threshold.

use nalgebra::Point2;
use pixeltrack_core::{GrayImageView, WidthCache};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Default intensity difference for the segment test.
pub const DEFAULT_THRESHOLD: i32 = 40;

/// Length of the contiguous arc that makes a corner.
pub const ARC_LENGTH: usize = 9;

/// Circle positions as `(dx, dy)`, clockwise from the top.
const CIRCLE: [(isize, isize); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastParams {
    pub threshold: i32,
}

impl Default for FastParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Flat circle offsets for an image row stride.
pub fn circle_offsets(width: usize) -> [isize; 16] {
    let w = width as isize;
    CIRCLE.map(|(dx, dy)| dy * w + dx)
}

#[inline]
fn brighter(a: i32, b: i32, threshold: i32) -> bool {
    a - b > threshold
}

#[inline]
fn darker(a: i32, b: i32, threshold: i32) -> bool {
    b - a > threshold
}

/// Quick reject: at least three of the four cardinal circle pixels must be
/// brighter than `p`, or at least three darker.
pub fn is_trivially_excluded(circle: &[i32; 16], p: i32, threshold: i32) -> bool {
    let cardinals = [circle[0], circle[4], circle[8], circle[12]];
    let brighter_count = cardinals
        .iter()
        .filter(|&&c| brighter(c, p, threshold))
        .count();
    if brighter_count >= 3 {
        return false;
    }
    let darker_count = cardinals
        .iter()
        .filter(|&&c| darker(c, p, threshold))
        .count();
    darker_count < 3
}

/// Full segment test on the sixteen circle values around `p`.
pub fn is_corner(p: i32, circle: &[i32; 16], threshold: i32) -> bool {
    if is_trivially_excluded(circle, p, threshold) {
        return false;
    }
    (0..16).any(|start| {
        let mut arc = (0..ARC_LENGTH).map(|k| circle[(start + k) & 15]);
        arc.clone().all(|c| brighter(p, c, threshold)) || arc.all(|c| darker(p, c, threshold))
    })
}

/// FAST detector with memoized per-width circle offsets.
#[derive(Debug, Default)]
pub struct FastCornerDetector {
    params: FastParams,
    offsets: WidthCache<[isize; 16]>,
}

impl FastCornerDetector {
    pub fn new(params: FastParams) -> Self {
        Self {
            params,
            offsets: WidthCache::new(),
        }
    }

    pub fn params(&self) -> &FastParams {
        &self.params
    }

    /// Corners as a flat `[x0, y0, x1, y1, ...]` list in row-major order.
    ///
    /// A three-pixel border is never tested. After a hit the next three
    /// columns of the same row are skipped.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(width = image.width, height = image.height))
    )]
    pub fn find_corners(&self, image: &GrayImageView<'_>) -> Vec<u32> {
        let (width, height) = (image.width, image.height);
        let mut corners = Vec::new();
        if width < 7 || height < 7 {
            return corners;
        }
        let offsets = self.offsets.get_or_insert_with(width, circle_offsets);
        let threshold = self.params.threshold;
        let data = image.data;
        let mut circle = [0i32; 16];

        for y in 3..height - 3 {
            let mut x = 3;
            while x < width - 3 {
                let w = (y * width + x) as isize;
                let p = data[w as usize] as i32;
                for (slot, off) in circle.iter_mut().zip(offsets.iter()) {
                    *slot = data[(w + off) as usize] as i32;
                }
                if is_corner(p, &circle, threshold) {
                    corners.push(x as u32);
                    corners.push(y as u32);
                    x += 3;
                }
                x += 1;
            }
        }
        log::debug!(
            "{} corners in {}x{} frame",
            corners.len() / 2,
            width,
            height
        );
        corners
    }

    /// Same as [`Self::find_corners`], as points.
    pub fn corners(&self, image: &GrayImageView<'_>) -> Vec<Point2<u32>> {
        self.find_corners(image)
            .chunks_exact(2)
            .map(|c| Point2::new(c[0], c[1]))
            .collect()
    }
}

/// Euclidean distance between two pixel positions.
pub fn distance(a: Point2<u32>, b: Point2<u32>) -> f64 {
    nalgebra::distance(&a.cast::<f64>(), &b.cast::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gray(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> Vec<u8> {
        (0..width * height).map(|i| f(i % width, i / width)).collect()
    }

    #[test]
    fn offsets_follow_width() {
        let o = circle_offsets(10);
        assert_eq!(o[0], -30);
        assert_eq!(o[4], 3);
        assert_eq!(o[8], 30);
        assert_eq!(o[12], -3);
        assert_eq!(o[2], -18);
    }

    #[test]
    fn isolated_bright_pixel_is_a_corner() {
        let data = gray(12, 12, |x, y| if (x, y) == (6, 6) { 100 } else { 0 });
        let view = GrayImageView::new(12, 12, &data).expect("valid");
        let det = FastCornerDetector::default();
        assert_eq!(det.find_corners(&view), vec![6, 6]);
    }

    #[test]
    fn low_contrast_is_ignored() {
        let data = gray(12, 12, |x, y| if (x, y) == (6, 6) { 40 } else { 0 });
        let view = GrayImageView::new(12, 12, &data).expect("valid");
        assert!(FastCornerDetector::default().find_corners(&view).is_empty());
    }

    #[test]
    fn wedge_apex_is_first_corner() {
        // Bright 90° wedge opening downwards with its apex at (6, 6).
        let data = gray(14, 14, |x, y| {
            if y >= 6 && (x as isize - 6).unsigned_abs() <= y - 6 {
                200
            } else {
                0
            }
        });
        let view = GrayImageView::new(14, 14, &data).expect("valid");
        let corners = FastCornerDetector::default().find_corners(&view);
        assert!(corners.len() >= 2);
        assert_eq!(&corners[..2], &[6, 6]);
    }

    /// 16x16 patch on a mid-gray background: two bright dots and one dark dot.
    fn patch(x: usize, y: usize) -> u8 {
        match (x, y) {
            (4, 4) | (6, 12) => 220,
            (11, 5) => 0,
            _ => 100,
        }
    }

    /// `patch` placed at `(ox, oy)` on a padded 40x40 canvas.
    fn canvas(ox: usize, oy: usize) -> Vec<u8> {
        gray(40, 40, |x, y| {
            if (ox..ox + 16).contains(&x) && (oy..oy + 16).contains(&y) {
                patch(x - ox, y - oy)
            } else {
                100
            }
        })
    }

    #[test]
    fn translation_moves_corners() {
        let det = FastCornerDetector::default();
        let (dx, dy) = (9u32, 6u32);
        let base_data = canvas(5, 5);
        let moved_data = canvas(5 + dx as usize, 5 + dy as usize);
        let base = det.corners(&GrayImageView::new(40, 40, &base_data).expect("valid"));
        let moved = det.corners(&GrayImageView::new(40, 40, &moved_data).expect("valid"));

        assert_eq!(
            base,
            vec![Point2::new(9, 9), Point2::new(16, 10), Point2::new(11, 17)]
        );
        let shifted: Vec<_> = base
            .iter()
            .map(|p| Point2::new(p.x + dx, p.y + dy))
            .collect();
        assert_eq!(moved, shifted);
    }

    #[test]
    fn flat_and_tiny_images_have_no_corners() {
        let det = FastCornerDetector::default();
        let flat = vec![128u8; 100];
        assert!(det
            .find_corners(&GrayImageView::new(10, 10, &flat).expect("valid"))
            .is_empty());
        let tiny = vec![255u8; 36];
        assert!(det
            .find_corners(&GrayImageView::new(6, 6, &tiny).expect("valid"))
            .is_empty());
    }

    #[test]
    fn trivial_exclusion_needs_three_cardinals() {
        let mut circle = [0i32; 16];
        circle[0] = 200;
        circle[4] = 200;
        assert!(is_trivially_excluded(&circle, 100, 40));
        circle[8] = 200;
        assert!(!is_trivially_excluded(&circle, 100, 40));
    }

    #[test]
    fn arc_wraps_around() {
        // Dark arc covering indices 12..=15 and 0..=4.
        let mut circle = [0i32; 16];
        for (i, c) in circle.iter_mut().enumerate() {
            *c = if !(5..12).contains(&i) { 0 } else { 200 };
        }
        assert!(is_corner(100, &circle, 40));
    }

    #[test]
    fn offsets_are_memoized_per_width() {
        let det = FastCornerDetector::default();
        let a = vec![0u8; 100];
        let b = vec![0u8; 120];
        det.find_corners(&GrayImageView::new(10, 10, &a).expect("valid"));
        det.find_corners(&GrayImageView::new(10, 10, &a).expect("valid"));
        det.find_corners(&GrayImageView::new(12, 10, &b).expect("valid"));
        assert_eq!(det.offsets.len(), 2);
    }

    #[test]
    fn distance_is_euclidean() {
        assert_relative_eq!(distance(Point2::new(0, 0), Point2::new(3, 4)), 5.0);
    }
}

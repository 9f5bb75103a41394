//! BRIEF binary descriptors and brute-force Hamming matching.

use nalgebra::Point2;
use pixeltrack_core::{GrayImageView, WidthCache};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Bits per descriptor.
pub const DESCRIPTOR_BITS: usize = 512;

/// 32-bit words per descriptor.
pub const DESCRIPTOR_WORDS: usize = DESCRIPTOR_BITS / 32;

/// Seed used by [`BriefExtractor::default`].
pub const DEFAULT_SEED: u64 = 0x5eed_b41e;

pub type Descriptor = [u32; DESCRIPTOR_WORDS];

/// Number of set bits.
#[inline]
pub fn hamming_weight(word: u32) -> u32 {
    word.count_ones()
}

/// Hamming distance between two descriptors.
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b).map(|(x, y)| hamming_weight(x ^ y)).sum()
}

/// Best match of one keypoint in the other set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub index1: usize,
    pub index2: usize,
    pub keypoint1: Point2<u32>,
    pub keypoint2: Point2<u32>,
    /// `1 - distance / DESCRIPTOR_BITS`.
    pub confidence: f64,
}

/// Samples pixel pairs in a fixed random pattern around each keypoint.
///
/// The pattern is drawn once from a seeded generator, so two extractors with
/// the same seed produce comparable descriptors.
#[derive(Debug)]
pub struct BriefExtractor {
    /// `(dx1, dy1, dx2, dy2)` per bit, each in `[-15, 16]`.
    pairs: Vec<[isize; 4]>,
    image_offsets: WidthCache<Arc<[(isize, isize)]>>,
}

impl Default for BriefExtractor {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl BriefExtractor {
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let pairs = (0..DESCRIPTOR_BITS)
            .map(|_| {
                [
                    rng.gen_range(-15..=16),
                    rng.gen_range(-15..=16),
                    rng.gen_range(-15..=16),
                    rng.gen_range(-15..=16),
                ]
            })
            .collect();
        Self {
            pairs,
            image_offsets: WidthCache::new(),
        }
    }

    fn offsets_for(&self, width: usize) -> Arc<[(isize, isize)]> {
        self.image_offsets.get_or_insert_with(width, |w| {
            let w = w as isize;
            self.pairs
                .iter()
                .map(|[x1, y1, x2, y2]| (y1 * w + x1, y2 * w + x2))
                .collect()
        })
    }

    /// One descriptor per keypoint, in keypoint order.
    ///
    /// A comparison that reaches outside the image contributes a zero bit.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(keypoints = keypoints.len()))
    )]
    pub fn describe(&self, image: &GrayImageView<'_>, keypoints: &[Point2<u32>]) -> Vec<Descriptor> {
        let offsets = self.offsets_for(image.width);
        let (w, h) = (image.width as isize, image.height as isize);
        let inside = |x: isize, y: isize| x >= 0 && y >= 0 && x < w && y < h;

        keypoints
            .iter()
            .map(|kp| {
                let (kx, ky) = (kp.x as isize, kp.y as isize);
                let base = ky * w + kx;
                let mut desc = [0u32; DESCRIPTOR_WORDS];
                for (bit, (pair, (o1, o2))) in self.pairs.iter().zip(offsets.iter()).enumerate() {
                    if !inside(kx + pair[0], ky + pair[1]) || !inside(kx + pair[2], ky + pair[3]) {
                        continue;
                    }
                    let a = image.data[(base + o1) as usize];
                    let b = image.data[(base + o2) as usize];
                    if a < b {
                        desc[bit >> 5] |= 1 << (bit & 31);
                    }
                }
                desc
            })
            .collect()
    }
}

/// For every descriptor in the first set, its nearest neighbour in the second.
///
/// Ties keep the lowest index. When the second set is empty nothing is
/// returned.
pub fn match_descriptors(
    keypoints1: &[Point2<u32>],
    descriptors1: &[Descriptor],
    keypoints2: &[Point2<u32>],
    descriptors2: &[Descriptor],
) -> Vec<Match> {
    if descriptors2.is_empty() {
        return Vec::new();
    }
    keypoints1
        .iter()
        .zip(descriptors1)
        .enumerate()
        .filter_map(|(i, (kp1, d1))| {
            let (j, dist) = descriptors2
                .iter()
                .enumerate()
                .map(|(j, d2)| (j, hamming_distance(d1, d2)))
                .min_by_key(|&(j, dist)| (dist, j))?;
            Some(Match {
                index1: i,
                index2: j,
                keypoint1: *kp1,
                keypoint2: *keypoints2.get(j)?,
                confidence: 1.0 - dist as f64 / DESCRIPTOR_BITS as f64,
            })
        })
        .collect()
}

/// Matches that are each other's best match in both directions.
pub fn reciprocal_match(
    keypoints1: &[Point2<u32>],
    descriptors1: &[Descriptor],
    keypoints2: &[Point2<u32>],
    descriptors2: &[Descriptor],
) -> Vec<Match> {
    let forward = match_descriptors(keypoints1, descriptors1, keypoints2, descriptors2);
    let backward = match_descriptors(keypoints2, descriptors2, keypoints1, descriptors1);
    forward
        .into_iter()
        .filter(|m| {
            backward
                .get(m.index2)
                .is_some_and(|b| b.index2 == m.index1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn textured(width: usize, height: usize, shift: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| {
                let (x, y) = ((i % width + shift) as u64, (i / width) as u64);
                ((x * 31 + y * 17 + (x * y) % 13 * 11) % 256) as u8
            })
            .collect()
    }

    #[test]
    fn hamming_counts_bits() {
        assert_eq!(hamming_weight(0), 0);
        assert_eq!(hamming_weight(0b1011), 3);
        assert_eq!(hamming_weight(u32::MAX), 32);
        let a = [u32::MAX; DESCRIPTOR_WORDS];
        let b = [0u32; DESCRIPTOR_WORDS];
        assert_eq!(hamming_distance(&a, &b), DESCRIPTOR_BITS as u32);
    }

    #[test]
    fn pattern_is_deterministic_and_bounded() {
        let a = BriefExtractor::with_seed(7);
        let b = BriefExtractor::with_seed(7);
        assert_eq!(a.pairs, b.pairs);
        assert_eq!(a.pairs.len(), DESCRIPTOR_BITS);
        assert!(a.pairs.iter().flatten().all(|v| (-15..=16).contains(v)));
    }

    #[test]
    fn identical_patches_match_perfectly() {
        let data = textured(64, 64, 0);
        let view = GrayImageView::new(64, 64, &data).expect("valid");
        let brief = BriefExtractor::default();
        let kps = vec![Point2::new(20, 20), Point2::new(40, 30)];
        let desc = brief.describe(&view, &kps);
        let matches = match_descriptors(&kps, &desc, &kps, &desc);
        assert_eq!(matches.len(), 2);
        for (i, m) in matches.iter().enumerate() {
            assert_eq!(m.index1, i);
            assert_eq!(m.index2, i);
            assert_relative_eq!(m.confidence, 1.0);
        }
    }

    #[test]
    fn shifted_image_recovers_correspondence() {
        let a = textured(64, 64, 0);
        let b = textured(64, 64, 5);
        let va = GrayImageView::new(64, 64, &a).expect("valid");
        let vb = GrayImageView::new(64, 64, &b).expect("valid");
        let brief = BriefExtractor::default();
        // Content at x in `b` equals content at x + 5 in `a`.
        let kps_a = vec![Point2::new(25, 20), Point2::new(45, 40)];
        let kps_b = vec![Point2::new(20, 20), Point2::new(40, 40)];
        let da = brief.describe(&va, &kps_a);
        let db = brief.describe(&vb, &kps_b);
        let matches = reciprocal_match(&kps_a, &da, &kps_b, &db);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].index2, 0);
        assert_eq!(matches[1].index2, 1);
    }

    #[test]
    fn border_keypoints_do_not_panic() {
        let data = textured(16, 16, 0);
        let view = GrayImageView::new(16, 16, &data).expect("valid");
        let kps = vec![Point2::new(0, 0), Point2::new(15, 15)];
        let desc = BriefExtractor::default().describe(&view, &kps);
        assert_eq!(desc.len(), 2);
    }

    #[test]
    fn empty_second_set_yields_no_matches() {
        let kps = vec![Point2::new(1, 1)];
        let desc = vec![[0u32; DESCRIPTOR_WORDS]];
        assert!(match_descriptors(&kps, &desc, &[], &[]).is_empty());
        assert!(reciprocal_match(&kps, &desc, &[], &[]).is_empty());
    }

    #[test]
    fn reciprocal_drops_one_sided_matches() {
        let zero = [0u32; DESCRIPTOR_WORDS];
        let mut one_bit = zero;
        one_bit[0] = 1;
        let mut two_bits = zero;
        two_bits[0] = 3;
        let kp = Point2::new(0, 0);
        // Both descriptors of set 1 prefer set-2 index 0, which only picks one back.
        let forward = match_descriptors(&[kp, kp], &[zero, one_bit], &[kp], &[two_bits]);
        assert_eq!(forward.len(), 2);
        let kept = reciprocal_match(&[kp, kp], &[zero, one_bit], &[kp], &[two_bits]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].index1, 1);
    }
}

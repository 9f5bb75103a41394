//! Clustering of raw cascade hits into averaged detections.

use log::warn;
use pixeltrack_core::{Detection, DisjointSet, Rect};
use std::collections::BTreeMap;

/// Minimum overlap ratio, on both sides, for two hits to join a cluster.
pub const REGIONS_OVERLAP: f64 = 0.5;

/// True when `a` and `b` overlap enough to be the same object.
///
/// Boxes with zero area never overlap.
pub fn regions_overlap(a: &Rect, b: &Rect) -> bool {
    if !a.intersects(b) {
        return false;
    }
    match a.overlap_ratios(b) {
        Some((r1, r2)) => r1 >= REGIONS_OVERLAP && r2 >= REGIONS_OVERLAP,
        None => false,
    }
}

/// Union overlapping hits and average each cluster.
///
/// Every ordered pair is tested because the ratios are not symmetric in
/// their arguments. Clusters come out ordered by their representative index.
/// Averaged rectangles are divided by `coordinate_scale` to map them from
/// the working resolution back to the source frame.
pub fn merge_rectangles(rects: &[Rect], coordinate_scale: f32) -> Vec<Detection> {
    let mut set = DisjointSet::new(rects.len());
    let mut degenerate = 0usize;
    for (i, a) in rects.iter().enumerate() {
        if a.area() <= 0 {
            degenerate += 1;
            continue;
        }
        for (j, b) in rects.iter().enumerate() {
            if i != j && regions_overlap(a, b) {
                set.union(i, j);
            }
        }
    }
    if degenerate > 0 {
        warn!("skipped {degenerate} zero-area rectangles while merging");
    }

    let mut groups: BTreeMap<usize, ([i64; 4], u32)> = BTreeMap::new();
    for (i, r) in rects.iter().enumerate() {
        let entry = groups.entry(set.find(i)).or_insert(([0; 4], 0));
        entry.0[0] += r.x as i64;
        entry.0[1] += r.y as i64;
        entry.0[2] += r.width as i64;
        entry.0[3] += r.height as i64;
        entry.1 += 1;
    }

    groups
        .into_values()
        .map(|(sums, total)| {
            let avg = |v: i64| (v as f64 / total as f64 + 0.5).floor() as i32;
            let rect = Rect::new(avg(sums[0]), avg(sums[1]), avg(sums[2]), avg(sums[3]));
            Detection {
                rect: rect.unscale(coordinate_scale),
                total,
            }
        })
        .collect()
}

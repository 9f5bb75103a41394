//! Summed-area tables: standard, squared, 45° tilted and Sobel edge magnitude.
//!
//! Tables are inclusive and share the source layout: `table[y * width + x]`
//! holds the sum over every pixel `(x', y')` with `x' <= x` and `y' <= y`.
//! A sum over the half-open box `(x1, x2] × (y1, y2]` is therefore
//! `T[x2,y2] - T[x1,y2] - T[x2,y1] + T[x1,y1]`.
//!
//! The tilted table holds `Σ I(x', y')` over `y' <= y` and `|x - x'| <= y - y'`,
//! i.e. the upright triangle whose apex is `(x, y)`, clipped by the image.

use crate::filter::sobel;
use crate::GrayImageView;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The four summed-area tables of one frame.
#[derive(Clone, Debug, Default)]
pub struct IntegralImages {
    pub width: usize,
    pub height: usize,
    pub sum: Vec<i64>,
    pub square: Vec<i64>,
    pub tilted: Vec<i64>,
    /// Present only when edge filtering was requested.
    pub edges: Option<Vec<i64>>,
}

impl IntegralImages {
    /// Sum of `table` over `(x1, x2] × (y1, y2]`.
    #[inline]
    pub fn rect_sum(&self, table: &[i64], x1: usize, y1: usize, x2: usize, y2: usize) -> i64 {
        let w = self.width;
        table[y2 * w + x2] - table[y2 * w + x1] - table[y1 * w + x2] + table[y1 * w + x1]
    }

    /// Table entry at a flat index, zero when the index falls outside the table.
    #[inline]
    pub fn at(table: &[i64], index: isize) -> i64 {
        if index < 0 {
            return 0;
        }
        table.get(index as usize).copied().unwrap_or(0)
    }
}

/// Builds [`IntegralImages`] from grayscale frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegralImageBuilder {
    /// Also build the Sobel edge-magnitude table.
    pub with_edges: bool,
}

impl IntegralImageBuilder {
    pub fn new(with_edges: bool) -> Self {
        Self { with_edges }
    }

    pub fn build(&self, src: &GrayImageView<'_>) -> IntegralImages {
        let mut out = IntegralImages::default();
        self.build_into(src, &mut out);
        out
    }

    /// Rebuild the tables in place, reusing the buffers held by `out`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, src, out), fields(width = src.width, height = src.height))
    )]
    pub fn build_into(&self, src: &GrayImageView<'_>, out: &mut IntegralImages) {
        let (w, h) = (src.width, src.height);
        let n = w * h;
        out.width = w;
        out.height = h;
        reset(&mut out.sum, n);
        reset(&mut out.square, n);
        reset(&mut out.tilted, n);

        for y in 0..h {
            let mut row = 0i64;
            let mut row_sq = 0i64;
            for x in 0..w {
                let idx = y * w + x;
                let p = src.data[idx] as i64;
                row += p;
                row_sq += p * p;
                let above = if y > 0 { out.sum[idx - w] } else { 0 };
                let above_sq = if y > 0 { out.square[idx - w] } else { 0 };
                out.sum[idx] = above + row;
                out.square[idx] = above_sq + row_sq;
            }
        }

        compute_tilted(src, &mut out.tilted);

        if self.with_edges {
            let magnitude = sobel(src);
            let edges = out.edges.get_or_insert_with(Vec::new);
            reset(edges, n);
            for y in 0..h {
                let mut row = 0i64;
                for x in 0..w {
                    let idx = y * w + x;
                    row += magnitude.data[idx] as i64;
                    edges[idx] = row + if y > 0 { edges[idx - w] } else { 0 };
                }
            }
        } else {
            out.edges = None;
        }
    }
}

fn reset(buf: &mut Vec<i64>, len: usize) {
    buf.clear();
    buf.resize(len, 0);
}

/// Tilted table as the difference of two diagonal accumulations of row
/// prefix sums:
///
/// - `d1(x, y) = d1(x + 1, y - 1) + P(y, x)` sums the right triangle edges,
/// - `d2(x, y) = d2(x - 1, y - 1) + P(y, x - 1)` sums what lies left of the
///   triangle,
///
/// where `P(y, x)` is the inclusive prefix sum of row `y`. Beyond the right
/// border `d1` degenerates to the running total of all rows above.
fn compute_tilted(src: &GrayImageView<'_>, tilted: &mut [i64]) {
    let (w, h) = (src.width, src.height);
    if w == 0 || h == 0 {
        return;
    }
    let mut prefix = vec![0i64; w];
    let mut d1_prev = vec![0i64; w];
    let mut d2_prev = vec![0i64; w];
    let mut d1 = vec![0i64; w];
    let mut d2 = vec![0i64; w];
    let mut rows_total = 0i64;

    for y in 0..h {
        let mut acc = 0i64;
        for x in 0..w {
            acc += src.data[y * w + x] as i64;
            prefix[x] = acc;
        }
        for x in 0..w {
            let right = match (y, x + 1 < w) {
                (0, _) => 0,
                (_, true) => d1_prev[x + 1],
                (_, false) => rows_total,
            };
            d1[x] = right + prefix[x];
            d2[x] = match (y, x) {
                (_, 0) => 0,
                (0, _) => prefix[x - 1],
                _ => d2_prev[x - 1] + prefix[x - 1],
            };
            tilted[y * w + x] = d1[x] - d2[x];
        }
        rows_total += acc;
        std::mem::swap(&mut d1, &mut d1_prev);
        std::mem::swap(&mut d2, &mut d2_prev);
    }
}

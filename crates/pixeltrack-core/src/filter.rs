//! Separable convolution, Sobel gradient magnitude and Gaussian blur.
//!
//! All filters work on single-channel planes and clamp sample coordinates to
//! the image border.

use crate::GrayImageView;

/// Single-channel floating point plane (row-major).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FloatImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl FloatImage {
    pub fn from_gray(src: &GrayImageView<'_>) -> Self {
        Self {
            width: src.width,
            height: src.height,
            data: src.data.iter().map(|&v| v as f32).collect(),
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Round and saturate back to 8 bits.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
            .collect()
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum FilterError {
    #[error("blur diameter must be greater than 1 (got {0})")]
    InvalidDiameter(f32),
    #[error("convolution kernel is empty")]
    EmptyKernel,
}

/// Convolve every row with `weights` centred on each pixel.
pub fn horizontal_convolve(src: &FloatImage, weights: &[f32]) -> Result<FloatImage, FilterError> {
    if weights.is_empty() {
        return Err(FilterError::EmptyKernel);
    }
    let (w, h) = (src.width, src.height);
    let half = (weights.len() / 2) as isize;
    let mut out = vec![0.0f32; w * h];
    for y in 0..h {
        let row = &src.data[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0.0;
            for (k, &wt) in weights.iter().enumerate() {
                let sx = (x as isize + k as isize - half).clamp(0, w as isize - 1) as usize;
                acc += row[sx] * wt;
            }
            out[y * w + x] = acc;
        }
    }
    Ok(FloatImage {
        width: w,
        height: h,
        data: out,
    })
}

/// Convolve every column with `weights` centred on each pixel.
pub fn vertical_convolve(src: &FloatImage, weights: &[f32]) -> Result<FloatImage, FilterError> {
    if weights.is_empty() {
        return Err(FilterError::EmptyKernel);
    }
    let (w, h) = (src.width, src.height);
    let half = (weights.len() / 2) as isize;
    let mut out = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, &wt) in weights.iter().enumerate() {
                let sy = (y as isize + k as isize - half).clamp(0, h as isize - 1) as usize;
                acc += src.data[sy * w + x] * wt;
            }
            out[y * w + x] = acc;
        }
    }
    Ok(FloatImage {
        width: w,
        height: h,
        data: out,
    })
}

/// Horizontal pass with `horizontal` followed by a vertical pass with `vertical`.
pub fn separable_convolve(
    src: &FloatImage,
    horizontal: &[f32],
    vertical: &[f32],
) -> Result<FloatImage, FilterError> {
    vertical_convolve(&horizontal_convolve(src, horizontal)?, vertical)
}

const SOBEL_SIGN: [f32; 3] = [-1.0, 0.0, 1.0];
const SOBEL_SCALE: [f32; 3] = [1.0, 2.0, 1.0];

/// Sobel gradient magnitude `sqrt(gx² + gy²)` of a grayscale image.
pub fn sobel(src: &GrayImageView<'_>) -> FloatImage {
    let plane = FloatImage::from_gray(src);
    if plane.data.is_empty() {
        return plane;
    }
    // Kernels are fixed and non-empty.
    let (Ok(gx), Ok(gy)) = (
        separable_convolve(&plane, &SOBEL_SIGN, &SOBEL_SCALE),
        separable_convolve(&plane, &SOBEL_SCALE, &SOBEL_SIGN),
    ) else {
        return plane;
    };
    let data = gx
        .data
        .iter()
        .zip(&gy.data)
        .map(|(x, y)| (x * x + y * y).sqrt())
        .collect();
    FloatImage {
        width: plane.width,
        height: plane.height,
        data,
    }
}

/// Normalised Gaussian kernel for a blur of the given diameter.
///
/// The kernel length is the diameter rounded up to the next odd integer and
/// sigma is `(diameter / 2 + 0.5) / 3`.
pub fn gaussian_kernel(diameter: f32) -> Result<Vec<f32>, FilterError> {
    let diameter = diameter.abs();
    if diameter <= 1.0 || !diameter.is_finite() {
        return Err(FilterError::InvalidDiameter(diameter));
    }
    let ceil = diameter.ceil() as usize;
    let len = ceil + (1 - ceil % 2);
    let rho = (diameter / 2.0 + 0.5) / 3.0;
    let rho_factor = -1.0 / (2.0 * rho * rho);
    let middle = (len / 2) as f32;

    let mut weights: Vec<f32> = (0..len)
        .map(|i| {
            let x = i as f32 - middle;
            (x * x * rho_factor).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    Ok(weights)
}

/// Gaussian blur of a grayscale image.
pub fn gaussian_blur(src: &GrayImageView<'_>, diameter: f32) -> Result<FloatImage, FilterError> {
    let kernel = gaussian_kernel(diameter)?;
    separable_convolve(&FloatImage::from_gray(src), &kernel, &kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sobel_is_zero_on_flat_image() {
        let data = vec![90u8; 25];
        let view = GrayImageView::new(5, 5, &data).expect("valid");
        let mag = sobel(&view);
        assert!(mag.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn sobel_responds_to_vertical_edge() {
        let mut data = vec![0u8; 36];
        for y in 0..6 {
            for x in 3..6 {
                data[y * 6 + x] = 100;
            }
        }
        let view = GrayImageView::new(6, 6, &data).expect("valid");
        let mag = sobel(&view);
        // Columns 2 and 3 straddle the edge: |gx| = 4 * 100.
        assert_abs_diff_eq!(mag.get(2, 3), 400.0, epsilon = 1e-3);
        assert_abs_diff_eq!(mag.get(3, 3), 400.0, epsilon = 1e-3);
        assert_abs_diff_eq!(mag.get(0, 3), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn gaussian_kernel_is_normalised_and_odd() {
        let k = gaussian_kernel(4.0).expect("kernel");
        assert_eq!(k.len(), 5);
        assert_abs_diff_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(k[0], k[4], epsilon = 1e-7);
        assert!(k[2] > k[1]);
    }

    #[test]
    fn blur_rejects_small_diameter() {
        let data = [0u8; 4];
        let view = GrayImageView::new(2, 2, &data).expect("valid");
        assert_eq!(
            gaussian_blur(&view, 1.0).unwrap_err(),
            FilterError::InvalidDiameter(1.0)
        );
    }

    #[test]
    fn blur_preserves_constant_image() {
        let data = vec![42u8; 49];
        let view = GrayImageView::new(7, 7, &data).expect("valid");
        let out = gaussian_blur(&view, 3.0).expect("blur");
        assert!(out.to_u8().iter().all(|&v| v == 42));
    }
}

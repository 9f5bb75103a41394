//! Borrowed pixel buffers and grayscale conversion.

/// Errors raised when a raw buffer does not describe the frame it claims to.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame buffer length (expected {expected} bytes, got {got})")]
    InvalidLength { expected: usize, got: usize },
    #[error("frame dimensions overflow (width={width}, height={height})")]
    Overflow { width: usize, height: usize },
}

fn expected_len(width: usize, height: usize, channels: usize) -> Result<usize, FrameError> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(FrameError::Overflow { width, height })
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayImageView<'a> {
    /// Wrap a single-channel buffer, checking its length.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, FrameError> {
        let expected = expected_len(width, height, 1)?;
        if data.len() != expected {
            return Err(FrameError::InvalidLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Row-major RGBA frame, 4 bytes per pixel.
#[derive(Clone, Copy, Debug)]
pub struct RgbaImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // len = w*h*4
}

impl<'a> RgbaImageView<'a> {
    pub const CHANNELS: usize = 4;

    /// Wrap an RGBA buffer, checking its length.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, FrameError> {
        let expected = expected_len(width, height, Self::CHANNELS)?;
        if data.len() != expected {
            return Err(FrameError::InvalidLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// `[r, g, b, a]` at pixel `(x, y)`.
    #[inline]
    pub fn rgba(&self, x: usize, y: usize) -> [u8; 4] {
        let w = (y * self.width + x) * Self::CHANNELS;
        [
            self.data[w],
            self.data[w + 1],
            self.data[w + 2],
            self.data[w + 3],
        ]
    }

    /// Luma plane of this frame.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self
                .data
                .chunks_exact(Self::CHANNELS)
                .map(|p| luma(p[0], p[1], p[2]))
                .collect(),
        }
    }
}

/// ITU-R BT.601 luma (`0.299 r + 0.587 g + 0.114 b`), truncated.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

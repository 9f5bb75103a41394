use crate::brief::{BriefExtractor, Descriptor};
use crate::fast::{FastCornerDetector, FastParams};
use nalgebra::Point2;
use pixeltrack_core::{gaussian_blur, FilterError, FrameError, GrayImageView, RgbaImageView, Tracker};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum KeypointError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Settings for [`CornerTracker`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerParams {
    pub fast: FastParams,
    /// Gaussian blur diameter applied before corner detection.
    pub blur: Option<f32>,
    /// Compute a BRIEF descriptor for every corner.
    pub describe: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub position: Point2<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<Descriptor>,
}

/// Grayscale conversion, optional blur, FAST and optional BRIEF.
#[derive(Debug, Default)]
pub struct CornerTracker {
    params: CornerParams,
    fast: FastCornerDetector,
    brief: BriefExtractor,
}

impl CornerTracker {
    pub fn new(params: CornerParams) -> Result<Self, KeypointError> {
        if let Some(d) = params.blur {
            pixeltrack_core::filter::gaussian_kernel(d)?;
        }
        Ok(Self {
            params,
            fast: FastCornerDetector::new(params.fast),
            brief: BriefExtractor::default(),
        })
    }

    pub fn with_brief(mut self, brief: BriefExtractor) -> Self {
        self.brief = brief;
        self
    }

    pub fn params(&self) -> &CornerParams {
        &self.params
    }

    /// Keypoints of an already grayscale image.
    pub fn track_gray(&self, gray: &GrayImageView<'_>) -> Result<Vec<Keypoint>, KeypointError> {
        let blurred;
        let source = match self.params.blur {
            Some(d) => {
                blurred = gaussian_blur(gray, d)?.to_u8();
                GrayImageView::new(gray.width, gray.height, &blurred)?
            }
            None => *gray,
        };
        let corners = self.fast.corners(&source);
        if !self.params.describe {
            return Ok(corners
                .into_iter()
                .map(|position| Keypoint {
                    position,
                    descriptor: None,
                })
                .collect());
        }
        let descriptors = self.brief.describe(&source, &corners);
        Ok(corners
            .into_iter()
            .zip(descriptors)
            .map(|(position, d)| Keypoint {
                position,
                descriptor: Some(d),
            })
            .collect())
    }
}

impl Tracker for CornerTracker {
    type Output = Keypoint;
    type Error = KeypointError;

    fn track(&self, frame: &RgbaImageView<'_>) -> Result<Vec<Keypoint>, KeypointError> {
        let gray = frame.to_gray();
        self.track_gray(&gray.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_dot(w: usize, h: usize, cx: usize, cy: usize) -> Vec<u8> {
        let mut data = vec![0u8; w * h * 4];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        let i = (cy * w + cx) * 4;
        data[i..i + 3].copy_from_slice(&[255, 255, 255]);
        data
    }

    #[test]
    fn finds_dot_in_rgba_frame() {
        let data = rgba_dot(16, 16, 8, 9);
        let frame = RgbaImageView::new(16, 16, &data).expect("frame");
        let tracker = CornerTracker::new(CornerParams::default()).expect("tracker");
        let kps = tracker.track(&frame).expect("track");
        assert_eq!(kps.len(), 1);
        assert_eq!(kps[0].position, Point2::new(8, 9));
        assert!(kps[0].descriptor.is_none());
    }

    #[test]
    fn descriptors_follow_corners() {
        let data = rgba_dot(40, 40, 20, 20);
        let frame = RgbaImageView::new(40, 40, &data).expect("frame");
        let params = CornerParams {
            describe: true,
            ..CornerParams::default()
        };
        let kps = CornerTracker::new(params)
            .expect("tracker")
            .track(&frame)
            .expect("track");
        assert_eq!(kps.len(), 1);
        assert!(kps[0].descriptor.is_some());
    }

    #[test]
    fn invalid_blur_is_rejected_up_front() {
        let params = CornerParams {
            blur: Some(0.5),
            ..CornerParams::default()
        };
        assert!(matches!(
            CornerTracker::new(params),
            Err(KeypointError::Filter(FilterError::InvalidDiameter(_)))
        ));
    }

    #[test]
    fn blur_runs_before_detection() {
        let data = vec![10u8; 20 * 20];
        let gray = GrayImageView::new(20, 20, &data).expect("valid");
        let params = CornerParams {
            blur: Some(3.0),
            ..CornerParams::default()
        };
        let kps = CornerTracker::new(params)
            .expect("tracker")
            .track_gray(&gray)
            .expect("track");
        assert!(kps.is_empty());
    }
}

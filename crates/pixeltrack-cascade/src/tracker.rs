use crate::classifier::CascadeClassifier;
use crate::detector::{check_coordinate_scale, scan, ViolaJonesParams};
use crate::error::CascadeError;
use crate::merge::merge_rectangles;
use pixeltrack_core::{Detection, IntegralImageBuilder, RgbaImageView, Tracker};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Runs one or more cascades over each frame.
///
/// The summed-area tables are built once per frame and shared by every
/// classifier; detections from different classifiers are concatenated in
/// classifier order and never merged with each other.
#[derive(Clone, Debug)]
pub struct ObjectTracker {
    classifiers: Vec<Arc<CascadeClassifier>>,
    params: ViolaJonesParams,
    coordinate_scale: f32,
}

impl ObjectTracker {
    pub fn new(
        classifiers: Vec<Arc<CascadeClassifier>>,
        params: ViolaJonesParams,
    ) -> Result<Self, CascadeError> {
        if classifiers.is_empty() {
            return Err(CascadeError::NoClassifiers);
        }
        params.validate()?;
        Ok(Self {
            classifiers,
            params,
            coordinate_scale: 1.0,
        })
    }

    /// Tracker over a single classifier decoded from its flat layout.
    pub fn from_flat(data: &[f64], params: ViolaJonesParams) -> Result<Self, CascadeError> {
        let classifier = CascadeClassifier::from_flat(data)?;
        Self::new(vec![Arc::new(classifier)], params)
    }

    /// Factor the frames passed to [`Tracker::track`] were reduced by.
    ///
    /// Frames are never upscaled, so the factor must lie in `(0, 1]`.
    pub fn with_coordinate_scale(mut self, scale: f32) -> Result<Self, CascadeError> {
        self.set_coordinate_scale(scale)?;
        Ok(self)
    }

    pub fn set_coordinate_scale(&mut self, scale: f32) -> Result<(), CascadeError> {
        self.coordinate_scale = check_coordinate_scale(scale)?;
        Ok(())
    }

    pub fn coordinate_scale(&self) -> f32 {
        self.coordinate_scale
    }

    pub fn params(&self) -> &ViolaJonesParams {
        &self.params
    }

    pub fn classifiers(&self) -> &[Arc<CascadeClassifier>] {
        &self.classifiers
    }
}

impl Tracker for ObjectTracker {
    type Output = Detection;
    type Error = CascadeError;

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(width = frame.width, height = frame.height, classifiers = self.classifiers.len()))
    )]
    fn track(&self, frame: &RgbaImageView<'_>) -> Result<Vec<Detection>, CascadeError> {
        let gray = frame.to_gray();
        let integral = IntegralImageBuilder::new(self.params.uses_edges()).build(&gray.view());
        let mut out = Vec::new();
        for classifier in &self.classifiers {
            let hits = scan(&integral, &self.params, classifier)?;
            out.extend(merge_rectangles(&hits, self.coordinate_scale));
        }
        Ok(out)
    }
}

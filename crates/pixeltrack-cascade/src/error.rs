use pixeltrack_core::FrameError;

/// Errors returned by the cascade detector and [`crate::ObjectTracker`].
#[derive(thiserror::Error, Debug)]
pub enum CascadeError {
    #[error("no classifiers supplied")]
    NoClassifiers,
    #[error("scale factor must be greater than 1 (got {scale_factor})")]
    NonTerminatingScale { scale_factor: f32 },
    #[error("initial scale must be positive and finite (got {0})")]
    InvalidInitialScale(f32),
    #[error("step size must be positive and finite (got {0})")]
    InvalidStepSize(f32),
    #[error("edge density must lie in [0, 1] (got {0})")]
    InvalidEdgesDensity(f32),
    #[error("coordinate scale must lie in (0, 1] (got {0})")]
    InvalidCoordinateScale(f32),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("invalid classifier: {0}")]
    Asset(#[from] ClassifierFormatError),
}

/// Malformed flat classifier array.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClassifierFormatError {
    #[error("classifier data ends at offset {offset} while reading {field}")]
    Truncated { offset: usize, field: &'static str },
    #[error("classifier window must be at least 1x1 (got {width}x{height})")]
    InvalidWindow { width: f64, height: f64 },
    #[error("invalid {field} {value} at offset {offset}")]
    InvalidCount {
        offset: usize,
        field: &'static str,
        value: f64,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ClassifierIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Format(#[from] ClassifierFormatError),
}

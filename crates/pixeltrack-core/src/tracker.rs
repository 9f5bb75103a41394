use crate::RgbaImageView;

/// A detector that turns one RGBA frame into a list of results.
///
/// Implementations hold only configuration and read-only shared data, so a
/// tracker can be reused across frames.
pub trait Tracker {
    type Output;
    type Error: std::error::Error;

    fn track(&self, frame: &RgbaImageView<'_>) -> Result<Vec<Self::Output>, Self::Error>;
}

//! End-to-end helpers on top of the `image` crate.

use crate::config::{TrackConfig, TrackReport, TrackResults, TrackerConfig};
use ::image::{imageops, imageops::FilterType, RgbaImage};
use nalgebra::Point2;
use pixeltrack_cascade::{
    CascadeClassifier, CascadeError, ClassifierIoError, ObjectTracker, ViolaJonesParams,
};
use pixeltrack_color::{ColorError, ColorParams, ColorRegion, ColorTracker};
use pixeltrack_core::{Detection, GrayImageView, RgbaImageView, ScaleAdvisor, Tracker};
use pixeltrack_keypoints::{CornerParams, CornerTracker, Keypoint, KeypointError};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level helpers.
#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
    #[error("failed to load classifier {path}: {source}")]
    Classifier {
        path: String,
        #[source]
        source: ClassifierIoError,
    },
    #[error(transparent)]
    Cascade(#[from] CascadeError),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error(transparent)]
    Keypoint(#[from] KeypointError),
}

/// Borrow an `image::RgbaImage` as a core frame view.
pub fn rgba_view(img: &RgbaImage) -> RgbaImageView<'_> {
    RgbaImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Borrow an `image::GrayImage` as a core grayscale view.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Run the cascade detector over an image.
pub fn detect_objects(
    img: &RgbaImage,
    classifier: &CascadeClassifier,
    params: &ViolaJonesParams,
) -> Result<Vec<Detection>, CascadeError> {
    pixeltrack_cascade::detect(&rgba_view(img), params, classifier, 1.0)
}

/// Run the color tracker with the built-in colors.
pub fn track_colors(img: &RgbaImage, params: ColorParams) -> Result<Vec<ColorRegion>, ColorError> {
    ColorTracker::with_builtins(params)?.track(&rgba_view(img))
}

/// Run FAST (and optionally BRIEF) over an image.
pub fn find_corners(img: &RgbaImage, params: CornerParams) -> Result<Vec<Keypoint>, KeypointError> {
    CornerTracker::new(params)?.track(&rgba_view(img))
}

/// Load the image named by `config`, run its tracker and build the report.
///
/// With `auto_scale` the frame is resized to the [`ScaleAdvisor`] working
/// resolution first and every result is mapped back to source coordinates.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(config), fields(image = %config.image_path))
)]
pub fn run(config: &TrackConfig) -> Result<TrackReport, TrackError> {
    let source = ::image::open(&config.image_path)?.to_rgba8();
    let (width, height) = (source.width() as usize, source.height() as usize);

    let mut advisor = ScaleAdvisor::new();
    let scale = if config.auto_scale {
        advisor.adjust_scale(width, height)
    } else {
        1.0
    };
    let working = if scale < 1.0 {
        let (w, h) = advisor.working_size(width, height);
        log::info!("tracking at {}x{} (scale {})", w, h, scale);
        imageops::resize(&source, w as u32, h as u32, FilterType::Triangle)
    } else {
        source
    };
    let frame = rgba_view(&working);

    let results = match &config.tracker {
        TrackerConfig::Object {
            classifiers,
            params,
        } => {
            let loaded = classifiers
                .iter()
                .map(|path| {
                    CascadeClassifier::load_json(path)
                        .map(Arc::new)
                        .map_err(|source| TrackError::Classifier {
                            path: path.display().to_string(),
                            source,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let tracker = ObjectTracker::new(loaded, *params)?.with_coordinate_scale(scale)?;
            TrackResults::Object(tracker.track(&frame)?)
        }
        TrackerConfig::Color { params } => {
            let regions = ColorTracker::with_builtins(params.clone())?.track(&frame)?;
            TrackResults::Color(
                regions
                    .into_iter()
                    .map(|r| ColorRegion {
                        rect: r.rect.unscale(scale),
                        color: r.color,
                    })
                    .collect(),
            )
        }
        TrackerConfig::Corners { params } => {
            let keypoints = CornerTracker::new(*params)?.track(&frame)?;
            TrackResults::Corners(
                keypoints
                    .into_iter()
                    .map(|k| Keypoint {
                        position: unscale_point(k.position, scale),
                        descriptor: k.descriptor,
                    })
                    .collect(),
            )
        }
    };
    log::info!("{} results in {}", results.len(), config.image_path);

    Ok(TrackReport {
        image_path: config.image_path.clone(),
        width,
        height,
        scale,
        results,
    })
}

fn unscale_point(p: Point2<u32>, scale: f32) -> Point2<u32> {
    if scale <= 0.0 || scale == 1.0 {
        return p;
    }
    let s = scale as f64;
    Point2::new(
        (p.x as f64 / s).round() as u32,
        (p.y as f64 / s).round() as u32,
    )
}

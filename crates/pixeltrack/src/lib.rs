//! Feature tracking on raw RGBA frames.
//!
//! This crate provides:
//! - re-exports of the detector crates (`cascade`, `color`, `keypoints`, `core`)
//! - JSON run configuration and reports ([`config`])
//! - (feature `image`) end-to-end helpers from `image::RgbaImage` ([`detect`])
//! - (feature `cli`) the `pixeltrack` command line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use pixeltrack::color::{ColorParams, ColorTracker};
//! use pixeltrack::core::{RgbaImageView, Tracker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pixels = vec![0u8; 320 * 240 * 4];
//! let frame = RgbaImageView::new(320, 240, &pixels)?;
//! let tracker = ColorTracker::with_builtins(ColorParams::default())?;
//! for region in tracker.track(&frame)? {
//!     println!("{} at {:?}", region.color, region.rect);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `pixeltrack::core`: frame views, filters, summed-area tables, rectangles,
//!   union-find, scale advice, the `Tracker` trait.
//! - `pixeltrack::cascade`: Viola-Jones classifiers and `ObjectTracker`.
//! - `pixeltrack::keypoints`: FAST corners, BRIEF descriptors, `CornerTracker`.
//! - `pixeltrack::color`: color registry and `ColorTracker`.

pub use pixeltrack_cascade as cascade;
pub use pixeltrack_color as color;
pub use pixeltrack_core as core;
pub use pixeltrack_keypoints as keypoints;

pub use pixeltrack_cascade::{CascadeClassifier, ObjectTracker, ViolaJonesParams};
pub use pixeltrack_color::{ColorParams, ColorRegion, ColorRegistry, ColorTracker};
pub use pixeltrack_core::{Detection, Rect, RgbaImageView, ScaleAdvisor, Tracker};
pub use pixeltrack_keypoints::{CornerParams, CornerTracker, FastCornerDetector, Keypoint};

pub mod config;

#[cfg(feature = "image")]
pub mod detect;

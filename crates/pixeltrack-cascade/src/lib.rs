//! Viola-Jones style object detection over summed-area tables.
//!
//! A [`CascadeClassifier`] is decoded once from its flat numeric layout and
//! then shared read-only. Each frame goes through three steps:
//!
//! 1. build the summed-area tables (plus the Sobel table when the edge
//!    pre-filter is on),
//! 2. [`scan`] a growing window over every position and keep the windows
//!    that pass every stage,
//! 3. [`merge_rectangles`] clusters overlapping hits and averages them.
//!
//! ```no_run
//! use pixeltrack_cascade::{detect, CascadeClassifier, ViolaJonesParams};
//! use pixeltrack_core::RgbaImageView;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = CascadeClassifier::load_json("face.json")?;
//! let pixels = vec![0u8; 320 * 240 * 4];
//! let frame = RgbaImageView::new(320, 240, &pixels)?;
//! let faces = detect(&frame, &ViolaJonesParams::default(), &classifier, 1.0)?;
//! println!("{} faces", faces.len());
//! # Ok(())
//! # }
//! ```

mod classifier;
mod detector;
mod error;
mod merge;
mod tracker;

pub use classifier::{CascadeClassifier, FeatureRect, Node, Stage};
pub use detector::{detect, detect_gray, scan, ViolaJonesParams, Window};
pub use error::{CascadeError, ClassifierFormatError, ClassifierIoError};
pub use merge::{merge_rectangles, regions_overlap, REGIONS_OVERLAP};
pub use tracker::ObjectTracker;

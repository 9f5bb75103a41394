//! Corner keypoints and binary descriptors.
//!
//! [`FastCornerDetector`] finds FAST-9 corners on a grayscale frame;
//! [`BriefExtractor`] turns corners into 512-bit descriptors that
//! [`match_descriptors`] and [`reciprocal_match`] compare by Hamming distance.
//! [`CornerTracker`] chains them behind the core [`pixeltrack_core::Tracker`] trait.

pub mod brief;
pub mod fast;
mod tracker;

pub use brief::{
    hamming_distance, hamming_weight, match_descriptors, reciprocal_match, BriefExtractor,
    Descriptor, Match, DESCRIPTOR_BITS, DESCRIPTOR_WORDS,
};
pub use fast::{distance, FastCornerDetector, FastParams, DEFAULT_THRESHOLD};
pub use tracker::{CornerParams, CornerTracker, Keypoint, KeypointError};

//! Core types and utilities shared by the pixeltrack detectors.
//!
//! This crate holds everything the detectors have in common: borrowed frame
//! views, image filters, summed-area tables, rectangle/overlap math, the
//! union-find used to cluster raw hits, per-width offset caches and the
//! working-resolution advisor. It knows nothing about classifiers, colors or
//! corners.

mod cache;
mod disjoint_set;
pub mod filter;
mod image;
mod integral;
mod logger;
mod rect;
mod scale;
mod tracker;

pub use cache::WidthCache;
pub use disjoint_set::DisjointSet;
pub use filter::{gaussian_blur, sobel, FilterError, FloatImage};
pub use image::{luma, FrameError, GrayImage, GrayImageView, RgbaImageView};
pub use integral::{IntegralImageBuilder, IntegralImages};
pub use rect::{intersect_rect, Detection, Rect};
pub use scale::{scale_for_frame, ScaleAdvisor, MIN_SCALE, PIXEL_THRESHOLD};
pub use tracker::Tracker;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

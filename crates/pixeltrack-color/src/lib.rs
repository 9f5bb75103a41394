//! Color blob detection.
//!
//! Every pixel seeds a flood fill over its 8-connected neighbours that match
//! a named color predicate. Components with enough pixels become bounding
//! boxes, which are merged by a single forward sweep and filtered by size.
//! Colors come from a [`ColorRegistry`]; `cyan`, `magenta` and `yellow` are
//! built in and more can be registered.

mod detector;
mod registry;

pub use detector::{merge_regions, ColorError, ColorParams, ColorRegion, ColorTracker};
pub use registry::{is_cyan, is_magenta, is_yellow, ColorPredicate, ColorRegistry, PixelSample};

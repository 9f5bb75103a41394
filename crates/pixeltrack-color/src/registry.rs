//! Named color predicates.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One pixel as seen by a color predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    /// Byte offset of the pixel in the RGBA buffer.
    pub index: usize,
    pub x: usize,
    pub y: usize,
}

pub type ColorPredicate = Arc<dyn Fn(&PixelSample) -> bool + Send + Sync>;

/// Maps color names to predicates.
///
/// Build it once, register any custom colors, then share it read-only
/// between trackers.
#[derive(Clone, Default)]
pub struct ColorRegistry {
    colors: BTreeMap<String, ColorPredicate>,
}

impl fmt::Debug for ColorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorRegistry")
            .field("colors", &self.colors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[inline]
fn distance_sq(s: &PixelSample, target: [i32; 3]) -> i32 {
    let dr = s.r as i32 - target[0];
    let dg = s.g as i32 - target[1];
    let db = s.b as i32 - target[2];
    dr * dr + dg * dg + db * db
}

pub fn is_cyan(s: &PixelSample) -> bool {
    let (r, g, b) = (s.r as i32, s.g as i32, s.b as i32);
    (g - r >= 50 && b - r >= 70) || distance_sq(s, [0, 255, 255]) < 6400
}

pub fn is_magenta(s: &PixelSample) -> bool {
    let (r, g, b) = (s.r as i32, s.g as i32, s.b as i32);
    (r - g >= 50 && b - g >= 50) || distance_sq(s, [255, 0, 255]) < 19600
}

pub fn is_yellow(s: &PixelSample) -> bool {
    let (r, g, b) = (s.r as i32, s.g as i32, s.b as i32);
    (r - b >= 50 && g - b >= 50) || distance_sq(s, [255, 255, 0]) < 10000
}

impl ColorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `cyan`, `magenta` and `yellow`.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register("cyan", is_cyan);
        reg.register("magenta", is_magenta);
        reg.register("yellow", is_yellow);
        reg
    }

    /// Add or replace a color.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&PixelSample) -> bool + Send + Sync + 'static,
    {
        self.colors.insert(name.into(), Arc::new(predicate));
    }

    pub fn get(&self, name: &str) -> Option<&ColorPredicate> {
        self.colors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    /// Registered names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

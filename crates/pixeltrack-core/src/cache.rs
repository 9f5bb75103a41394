//! Lazily filled per-width lookup tables.

use std::collections::HashMap;
use std::sync::Mutex;

/// Memoizes a value per image width.
///
/// Entries are never evicted; the set of widths seen by one process is small.
#[derive(Debug, Default)]
pub struct WidthCache<T> {
    entries: Mutex<HashMap<usize, T>>,
}

impl<T: Clone> WidthCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `width`, computing it with `make` on first use.
    pub fn get_or_insert_with(&self, width: usize, make: impl FnOnce(usize) -> T) -> T {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.entry(width).or_insert_with(|| make(width)).clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

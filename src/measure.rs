use std::collections::HashMap;

use serde::Serialize;

use crate::constants::limits;

/// Size of a piece of text as measured by the host
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
}

impl TextSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Text used to measure the height of one line
const LINE_HEIGHT_SAMPLE: &str = "a";

/// Cache of host text measurements.
///
/// Measuring goes through the host, so results are memoized per string.
/// Measurements only depend on the text, so entries stay valid across edits;
/// the cache is cleared when it grows past its capacity or the viewport changes.
#[derive(Debug, Default, Clone)]
pub struct WidthCache {
    cache: HashMap<String, TextSize>,
}

impl WidthCache {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Retrieve a measurement from the cache or compute it with `measure`
    pub fn get_or_measure(&mut self, text: &str, measure: impl FnOnce(&str) -> TextSize) -> TextSize {
        if let Some(size) = self.cache.get(text) {
            return *size;
        }
        if self.cache.len() >= limits::WIDTH_CACHE_CAPACITY {
            self.cache.clear();
        }
        let size = measure(text);
        self.cache.insert(text.to_string(), size);
        size
    }

    /// Height of a single line
    pub fn line_height(&mut self, measure: impl FnOnce(&str) -> TextSize) -> f64 {
        self.get_or_measure(LINE_HEIGHT_SAMPLE, measure).height
    }

    /// Document size: widest line by line count times line height
    pub fn content_size<'a>(
        &mut self,
        lines: impl Iterator<Item = &'a str>,
        mut measure: impl FnMut(&str) -> TextSize,
    ) -> TextSize {
        let mut width: f64 = 0.0;
        let mut count = 0usize;
        for line in lines {
            width = width.max(self.get_or_measure(line, &mut measure).width);
            count += 1;
        }
        let height = self.line_height(&mut measure) * count as f64;
        TextSize::new(width, height)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

//! Soft wrapping
//!
//! With `word_wrap` on, every line is broken into visual rows no wider than the
//! viewport, using the host's text measurements. Breaks fall after a run of
//! whitespace; a word wider than the viewport gets a row of its own.
//!
//! ## wrap/ Invariants
//!
//! - The map holds one entry per document line while wrapping is on, none while it is off.
//! - A break is the code-point column where a later row starts; breaks are ascending
//!   and never 0.
//! - Measurements go through the shared [`WidthCache`].

use crate::lines::{LineRange, LineStore};
use crate::measure::{TextSize, WidthCache};

/// Visual rows of one line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineWrap {
    /// Columns where the second and later rows start
    pub breaks: Vec<usize>,
    /// Width of the widest row
    pub width: f64,
}

impl LineWrap {
    pub fn rows(&self) -> usize {
        self.breaks.len() + 1
    }
}

/// Words with their trailing whitespace, as `(column, text)`.
/// Leading indentation stays with the first word.
fn segments(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let (mut start_byte, mut start_col) = (0, 0);
    let mut has_word = false;
    let mut prev_space = false;

    for (col, (i, c)) in text.char_indices().enumerate() {
        let space = c.is_whitespace();
        if prev_space && !space && has_word {
            out.push((start_col, &text[start_byte..i]));
            start_byte = i;
            start_col = col;
            has_word = false;
        }
        has_word |= !space;
        prev_space = space;
    }
    if start_byte < text.len() {
        out.push((start_col, &text[start_byte..]));
    }
    out
}

/// Break `text` into rows no wider than `view_width`
pub fn wrap_line(
    text: &str,
    view_width: f64,
    widths: &mut WidthCache,
    mut measure: impl FnMut(&str) -> TextSize,
) -> LineWrap {
    let mut wrap = LineWrap::default();
    let mut row = 0.0_f64;
    for (col, segment) in segments(text) {
        let width = widths.get_or_measure(segment, &mut measure).width;
        if row > 0.0 && row + width > view_width {
            wrap.breaks.push(col);
            wrap.width = wrap.width.max(row);
            row = 0.0;
        }
        row += width;
    }
    wrap.width = wrap.width.max(row);
    wrap
}

/// Wrap state of the whole document
#[derive(Debug, Clone, Default)]
pub struct WrapMap {
    /// Width lines are wrapped to; `None` while wrapping is off
    width: Option<f64>,
    lines: Vec<LineWrap>,
}

impl WrapMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> Option<f64> {
        self.width
    }

    pub fn is_enabled(&self) -> bool {
        self.width.is_some()
    }

    pub fn disable(&mut self) {
        self.width = None;
        self.lines.clear();
    }

    /// Wrap every line of `store` at `width`
    pub fn rewrap_all(
        &mut self,
        width: f64,
        store: &LineStore,
        widths: &mut WidthCache,
        mut measure: impl FnMut(&str) -> TextSize,
    ) {
        self.width = Some(width);
        self.lines = store
            .lines()
            .map(|text| wrap_line(text, width, widths, &mut measure))
            .collect();
        tracing::debug!(width, rows = self.visual_rows(), "rewrapped document");
    }

    /// Bring the map in step with `store` after an edit that reported `range`.
    /// Edits that change the line count report every line from the first one
    /// they touch to the end, so rewrapping `range` covers every shifted line.
    pub fn update(
        &mut self,
        store: &LineStore,
        range: LineRange,
        widths: &mut WidthCache,
        mut measure: impl FnMut(&str) -> TextSize,
    ) {
        let Some(width) = self.width else {
            return;
        };
        let count = store.line_count();
        self.lines.resize_with(count, LineWrap::default);
        for index in range.start..=range.end.min(count - 1) {
            if let Some(text) = store.line_text(index) {
                self.lines[index] = wrap_line(text, width, widths, &mut measure);
            }
        }
    }

    /// Break columns of `line`; empty when it fits or wrapping is off
    pub fn breaks(&self, line: usize) -> &[usize] {
        self.lines
            .get(line)
            .map(|wrap| wrap.breaks.as_slice())
            .unwrap_or_default()
    }

    /// Total number of visual rows
    pub fn visual_rows(&self) -> usize {
        self.lines.iter().map(LineWrap::rows).sum()
    }

    /// Width of the widest row in the document
    pub fn widest(&self) -> f64 {
        self.lines.iter().fold(0.0_f64, |widest, wrap| widest.max(wrap.width))
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

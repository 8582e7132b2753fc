//! Weft – Line store
//!
//! The document is held as a sequence of lines plus a caret and a selection
//! anchor. The selection is the span between the anchor and the caret; it is
//! empty when the two coincide.
//!
//! ## Indexing model
//!
//! Columns are **code‑point** offsets into a line, never byte offsets. Every
//! stored position is clamped to the current text, so a caret or selection
//! can never point past the end of its line after an edit.
//!
//! ## Invalidation
//!
//! Each mutating method returns the inclusive range of line indices whose
//! snapshot ([`Line`]) changed, or `None` when nothing changed. Edits that
//! change the number of lines report everything from the first touched line
//! to the last remaining line; whole-document replacements report
//! [`LineRange::ALL`].

pub mod words;

use serde::Serialize;

use crate::action::Motion;

/// A caret or anchor location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    /// Code-point offset within the line
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Inclusive range of line indices the host must redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    /// Whole-document sentinel
    pub const ALL: LineRange = LineRange {
        start: 0,
        end: usize::MAX,
    };

    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }

    #[must_use]
    pub fn union(self, other: LineRange) -> LineRange {
        if self.is_all() || other.is_all() {
            return Self::ALL;
        }
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

/// Snapshot of one line as handed to the host. Owned copy; never aliases the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub text: String,
    /// Caret column, present only on the caret's line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<usize>,
    /// This line's part of the selection as `(start, end)` columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<(usize, usize)>,
    /// Columns where soft-wrapped rows start; empty when the line fits or wrapping is off
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wraps: Vec<usize>,
}

/// Saved text and selection, used by undo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    lines: Vec<String>,
    caret: Position,
    anchor: Position,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of code-point column `col`, clamped to the end of `s`
fn byte_index(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(i, _)| i)
}

/// Split on `\r\n`, `\n` or a lone `\r`
fn split_lines(text: &str) -> Vec<String> {
    text.split("\r\n")
        .flat_map(|chunk| chunk.split(['\n', '\r']))
        .map(str::to_string)
        .collect()
}

type Projection = (Option<usize>, Option<(usize, usize)>);

#[derive(Debug, Clone)]
pub struct LineStore {
    lines: Vec<String>,
    caret: Position,
    anchor: Position,
    /// Column vertical motions try to return to
    preferred_col: Option<usize>,
}

impl LineStore {
    /// A document with one empty line
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            lines: split_lines(text),
            caret: Position::default(),
            anchor: Position::default(),
            preferred_col: None,
        }
    }

    // --- Queries ---

    /// Number of lines; never zero
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Copy of line `index`, or `None` past the end
    pub fn get_line(&self, index: usize) -> Option<Line> {
        let text = self.lines.get(index)?;
        let (cursor, selection) = self.projection(self.anchor, self.caret, index);
        Some(Line {
            text: text.clone(),
            cursor,
            selection,
            wraps: Vec::new(),
        })
    }

    pub fn line_text(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Length of a line in code points (0 past the end)
    pub fn line_len(&self, index: usize) -> usize {
        self.lines.get(index).map_or(0, |l| char_len(l))
    }

    /// Whole document joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    pub fn caret(&self) -> Position {
        self.caret
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.anchor != self.caret
    }

    /// Selection endpoints in document order
    pub fn selection(&self) -> (Position, Position) {
        (self.anchor.min(self.caret), self.anchor.max(self.caret))
    }

    pub fn selected_text(&self) -> String {
        let (start, end) = self.selection();
        self.text_between(start, end)
    }

    /// Text of lines `first..=last`, each terminated by a newline
    pub fn lines_text(&self, first: usize, last: usize) -> String {
        let last = last.min(self.lines.len() - 1);
        self.lines
            .get(first..=last)
            .map(|ls| ls.iter().map(|l| format!("{l}\n")).collect::<String>())
            .unwrap_or_default()
    }

    /// Clamp a position into the document
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.lines.len() - 1);
        Position {
            line,
            col: pos.col.min(self.line_len(line)),
        }
    }

    pub fn text_between(&self, start: Position, end: Position) -> String {
        let (start, end) = (self.clamp(start.min(end)), self.clamp(start.max(end)));
        if start.line == end.line {
            let l = &self.lines[start.line];
            return l[byte_index(l, start.col)..byte_index(l, end.col)].to_string();
        }

        let first = &self.lines[start.line];
        let mut out = first[byte_index(first, start.col)..].to_string();
        for l in &self.lines[start.line + 1..end.line] {
            out.push('\n');
            out.push_str(l);
        }
        out.push('\n');
        let last = &self.lines[end.line];
        out.push_str(&last[..byte_index(last, end.col)]);
        out
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lines: self.lines.clone(),
            caret: self.caret,
            anchor: self.anchor,
        }
    }

    // --- Text edits ---

    /// Insert text at the caret, replacing the selection
    pub fn insert_str(&mut self, s: &str) -> Option<LineRange> {
        if s.is_empty() && !self.has_selection() {
            return None;
        }
        let (start, end) = self.selection();
        Some(self.replace(start, end, s))
    }

    /// Backspace: deletes the selection, or the character before the caret
    /// (joining with the previous line at column 0)
    pub fn delete_backward(&mut self) -> Option<LineRange> {
        if self.has_selection() {
            return self.delete_selection();
        }
        let caret = self.caret;
        if caret.col > 0 {
            Some(self.replace(Position::new(caret.line, caret.col - 1), caret, ""))
        } else if caret.line > 0 {
            let prev = caret.line - 1;
            Some(self.replace(Position::new(prev, self.line_len(prev)), caret, ""))
        } else {
            None
        }
    }

    /// Delete: removes the selection, or the character after the caret
    /// (joining with the next line at the end of a line)
    pub fn delete_forward(&mut self) -> Option<LineRange> {
        if self.has_selection() {
            return self.delete_selection();
        }
        let caret = self.caret;
        if caret.col < self.line_len(caret.line) {
            Some(self.replace(caret, Position::new(caret.line, caret.col + 1), ""))
        } else if caret.line + 1 < self.lines.len() {
            Some(self.replace(caret, Position::new(caret.line + 1, 0), ""))
        } else {
            None
        }
    }

    /// Delete from the caret to where `motion` leads, or the selection if there is one
    pub fn delete_to(&mut self, motion: Motion) -> Option<LineRange> {
        if self.has_selection() {
            return self.delete_selection();
        }
        let caret = self.caret;
        let target = self.motion_target(caret, motion);
        self.delete_range(caret, target)
    }

    pub fn delete_selection(&mut self) -> Option<LineRange> {
        if !self.has_selection() {
            return None;
        }
        let (start, end) = self.selection();
        Some(self.replace(start, end, ""))
    }

    /// Delete the text between two positions (either order)
    pub fn delete_range(&mut self, a: Position, b: Position) -> Option<LineRange> {
        let (a, b) = (self.clamp(a), self.clamp(b));
        if a == b {
            return None;
        }
        Some(self.replace(a.min(b), a.max(b), ""))
    }

    /// Delete whole lines `first..=last`. At least one (empty) line always remains.
    /// The caret lands at the start of the line that takes their place.
    pub fn delete_lines(&mut self, first: usize, last: usize) -> Option<LineRange> {
        let count = self.lines.len();
        let (first, last) = (first.min(last), first.max(last).min(count - 1));
        if first >= count {
            return None;
        }

        if first == 0 && last == count - 1 {
            if count == 1 && self.lines[0].is_empty() {
                return None;
            }
            return Some(self.replace(
                Position::default(),
                Position::new(last, self.line_len(last)),
                "",
            ));
        }

        let range = if last + 1 < count {
            self.replace(Position::new(first, 0), Position::new(last + 1, 0), "")
        } else {
            let prev = first - 1;
            self.replace(
                Position::new(prev, self.line_len(prev)),
                Position::new(last, self.line_len(last)),
                "",
            )
        };

        let line = first.min(self.lines.len() - 1);
        self.caret = Position::new(line, 0);
        self.anchor = self.caret;
        Some(range.union(LineRange::single(line)))
    }

    /// Swap the characters on either side of the caret and step past them.
    /// At the end of a line the last two characters swap instead.
    pub fn transpose(&mut self) -> Option<LineRange> {
        let caret = self.caret;
        let len = self.line_len(caret.line);
        if self.has_selection() || caret.col == 0 || len < 2 {
            return None;
        }
        let col = caret.col.min(len - 1);
        let chars: Vec<char> = self.lines[caret.line].chars().collect();
        let (left, right) = (chars[col - 1], chars[col]);
        if left == right && col != caret.col {
            return None;
        }
        let swapped: String = [right, left].iter().collect();
        Some(self.replace(
            Position::new(caret.line, col - 1),
            Position::new(caret.line, col + 1),
            &swapped,
        ))
    }

    /// Comment out the lines the selection (or caret) covers with `token`,
    /// or uncomment them when every non-blank one already starts with it.
    /// A selection ending at column 0 leaves its last line alone.
    pub fn toggle_comment(&mut self, token: &str) -> Option<LineRange> {
        if token.is_empty() {
            return None;
        }
        let (start, end) = self.selection();
        let last_line = if end.line > start.line && end.col == 0 {
            end.line - 1
        } else {
            end.line
        };
        let targets: Vec<usize> = (start.line..=last_line)
            .filter(|&i| !self.lines[i].trim().is_empty())
            .collect();
        let (&first, &last) = (targets.first()?, targets.last()?);

        let uncomment = targets
            .iter()
            .all(|&i| self.lines[i].trim_start().starts_with(token));
        let indent = targets
            .iter()
            .map(|&i| words::first_non_blank(&self.lines[i]))
            .min()
            .unwrap_or(0);
        let token_len = char_len(token);

        for &i in &targets {
            let line = &mut self.lines[i];
            if uncomment {
                let at = words::first_non_blank(line);
                let rest = &line[byte_index(line, at + token_len)..];
                let removed = token_len + usize::from(rest.starts_with(' '));
                let from = byte_index(line, at);
                let to = byte_index(line, at + removed);
                line.replace_range(from..to, "");
                for mark in [&mut self.caret, &mut self.anchor] {
                    if mark.line == i && mark.col > at {
                        mark.col = mark.col.saturating_sub(removed).max(at);
                    }
                }
            } else {
                let at = byte_index(line, indent);
                line.insert_str(at, &format!("{token} "));
                for mark in [&mut self.caret, &mut self.anchor] {
                    if mark.line == i && mark.col >= indent {
                        mark.col += token_len + 1;
                    }
                }
            }
        }
        self.preferred_col = None;
        Some(LineRange::new(first, last))
    }

    /// Replace the whole document; caret returns to the origin
    pub fn replace_all(&mut self, text: &str) -> Option<LineRange> {
        let lines = split_lines(text);
        let origin = Position::default();
        if lines == self.lines && self.caret == origin && self.anchor == origin {
            return None;
        }
        self.lines = lines;
        self.caret = origin;
        self.anchor = origin;
        self.preferred_col = None;
        Some(LineRange::ALL)
    }

    /// Restore a saved state (undo/redo)
    pub fn restore(&mut self, snapshot: Snapshot) -> Option<LineRange> {
        self.lines = snapshot.lines;
        self.caret = snapshot.caret;
        self.anchor = snapshot.anchor;
        self.preferred_col = None;
        Some(LineRange::ALL)
    }

    /// Replace `[start, end)` with `text`, leaving the caret after the inserted text
    fn replace(&mut self, start: Position, end: Position, text: &str) -> LineRange {
        let old_count = self.lines.len();
        let (old_lo, old_hi) = self.selection();

        let first = &self.lines[start.line];
        let prefix = first[..byte_index(first, start.col)].to_string();
        let last = &self.lines[end.line];
        let suffix = last[byte_index(last, end.col)..].to_string();

        let mut new_lines = split_lines(text);
        let inserted = new_lines.len() - 1;
        let caret_col = if inserted == 0 {
            start.col + char_len(&new_lines[0])
        } else {
            char_len(&new_lines[inserted])
        };
        new_lines[0].insert_str(0, &prefix);
        new_lines[inserted].push_str(&suffix);
        self.lines.splice(start.line..=end.line, new_lines);

        self.caret = Position::new(start.line + inserted, caret_col);
        self.anchor = self.caret;
        self.preferred_col = None;

        let new_count = self.lines.len();
        let last_touched = if new_count == old_count {
            start.line + inserted
        } else {
            new_count - 1
        };
        // Lines the old caret or selection covered lose their marks
        let max_line = new_count - 1;
        LineRange::new(start.line, last_touched)
            .union(LineRange::new(old_lo.line.min(max_line), old_hi.line.min(max_line)))
    }

    // --- Caret and selection ---

    /// Where `motion` leads from `from`
    pub fn motion_target(&self, from: Position, motion: Motion) -> Position {
        let from = self.clamp(from);
        let len = self.line_len(from.line);
        let last_line = self.lines.len() - 1;
        match motion {
            Motion::Left => Position::new(from.line, from.col.saturating_sub(1)),
            Motion::Right => Position::new(from.line, (from.col + 1).min(len)),
            Motion::Up if from.line > 0 => self.vertical(from, from.line - 1),
            Motion::Down if from.line < last_line => self.vertical(from, from.line + 1),
            Motion::Up | Motion::Down => from,
            Motion::NextWord => {
                let text = &self.lines[from.line];
                let col = words::next_word(text, from.col);
                if col >= len && from.line < last_line {
                    let next = from.line + 1;
                    Position::new(next, words::first_non_blank(&self.lines[next]))
                } else {
                    Position::new(from.line, col)
                }
            }
            Motion::PreviousWord => {
                if from.col == 0 && from.line > 0 {
                    let prev = from.line - 1;
                    let text = &self.lines[prev];
                    Position::new(prev, words::prev_word(text, char_len(text)))
                } else {
                    Position::new(from.line, words::prev_word(&self.lines[from.line], from.col))
                }
            }
            Motion::StartOfLine => Position::new(from.line, 0),
            Motion::EndOfLine => Position::new(from.line, len),
            Motion::StartOfFile => Position::default(),
            Motion::EndOfFile => Position::new(last_line, self.line_len(last_line)),
        }
    }

    fn vertical(&self, from: Position, line: usize) -> Position {
        let col = self.preferred_col.unwrap_or(from.col);
        Position::new(line, col.min(self.line_len(line)))
    }

    /// Move the caret; with `extend` the anchor stays put
    pub fn move_caret(&mut self, motion: Motion, extend: bool) -> Option<LineRange> {
        self.repeat_motion(motion, 1, extend)
    }

    /// Apply `motion` up to `count` times, reporting only the net change
    pub fn repeat_motion(&mut self, motion: Motion, count: usize, extend: bool) -> Option<LineRange> {
        let preferred = match motion {
            Motion::Up | Motion::Down => Some(self.preferred_col.unwrap_or(self.caret.col)),
            _ => None,
        };
        self.preferred_col = preferred;

        let mut target = self.caret;
        for _ in 0..count.max(1) {
            let next = self.motion_target(target, motion);
            if next == target {
                break;
            }
            target = next;
        }

        let range = self.set_caret(target, extend);
        self.preferred_col = preferred;
        range
    }

    /// Where `count` repetitions of `motion` lead from the caret, without moving it
    pub fn repeated_target(&self, motion: Motion, count: usize) -> Position {
        let mut target = self.caret;
        for _ in 0..count.max(1) {
            let next = self.motion_target(target, motion);
            if next == target {
                break;
            }
            target = next;
        }
        target
    }

    pub fn set_caret(&mut self, pos: Position, extend: bool) -> Option<LineRange> {
        let anchor = if extend { self.anchor } else { pos };
        self.set_selection(anchor, pos)
    }

    pub fn set_selection(&mut self, anchor: Position, caret: Position) -> Option<LineRange> {
        let (old_anchor, old_caret) = (self.anchor, self.caret);
        self.anchor = self.clamp(anchor);
        self.caret = self.clamp(caret);
        self.preferred_col = None;
        self.selection_change(old_anchor, old_caret)
    }

    pub fn select_all(&mut self) -> Option<LineRange> {
        let last = self.lines.len() - 1;
        self.set_selection(Position::default(), Position::new(last, self.line_len(last)))
    }

    pub fn collapse_selection(&mut self) -> Option<LineRange> {
        self.set_selection(self.caret, self.caret)
    }

    /// Select the word (or whitespace/symbol run) at `pos`
    pub fn select_word_at(&mut self, pos: Position) -> Option<LineRange> {
        let pos = self.clamp(pos);
        let (start, end) = words::word_bounds(&self.lines[pos.line], pos.col);
        self.set_selection(Position::new(pos.line, start), Position::new(pos.line, end))
    }

    /// Select a whole line including its line break when one follows
    pub fn select_line(&mut self, line: usize) -> Option<LineRange> {
        let line = line.min(self.lines.len() - 1);
        let end = if line + 1 < self.lines.len() {
            Position::new(line + 1, 0)
        } else {
            Position::new(line, self.line_len(line))
        };
        self.set_selection(Position::new(line, 0), end)
    }

    /// Lines whose caret/selection marks differ between the old and current state
    fn selection_change(&self, old_anchor: Position, old_caret: Position) -> Option<LineRange> {
        let lo = old_anchor.min(old_caret).line.min(self.anchor.min(self.caret).line);
        let hi = old_anchor.max(old_caret).line.max(self.anchor.max(self.caret).line);
        let changed = |line: usize| {
            self.projection(old_anchor, old_caret, line) != self.projection(self.anchor, self.caret, line)
        };

        let first = (lo..=hi).find(|&line| changed(line))?;
        let last = (first..=hi).rev().find(|&line| changed(line)).unwrap_or(first);
        Some(LineRange::new(first, last))
    }

    fn projection(&self, anchor: Position, caret: Position, line: usize) -> Projection {
        let cursor = (caret.line == line).then_some(caret.col);
        if anchor == caret {
            return (cursor, None);
        }
        let (start, end) = (anchor.min(caret), anchor.max(caret));
        if line < start.line || line > end.line {
            return (cursor, None);
        }
        let from = if line == start.line { start.col } else { 0 };
        let to = if line == end.line {
            end.col
        } else {
            self.line_len(line)
        };
        (cursor, Some((from, to)))
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

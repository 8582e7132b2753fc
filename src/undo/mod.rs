//! Undo/Redo history
//!
//! A bounded, linear history of document states. Each entry is the state
//! from before an undo group started:
//! - Consecutive character inserts coalesce into one group
//! - Any other edit kind, or a caret movement in between, starts a new group
//! - Recording a new edit discards the redo branch

use std::collections::VecDeque;

// =============================================================================
// Edit Kinds
// =============================================================================

/// Kind of edit, used to decide undo grouping
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditType {
    /// Typing characters
    InsertChars,
    /// Line breaks and tabs
    InsertBreak,
    /// Deleting text
    Delete,
    /// Anything else (operators, whole-document changes)
    Other,
}

impl EditType {
    /// Whether an edit of this kind following `previous` starts a new undo group
    #[must_use]
    pub fn breaks_undo_group(self, previous: EditType) -> bool {
        self == EditType::Other || self != previous
    }
}

// =============================================================================
// Undo Stack
// =============================================================================

#[derive(Debug, Clone)]
pub struct UndoStack<T> {
    undos: VecDeque<T>,
    redos: Vec<T>,
    limit: usize,
    /// Kind of the most recent edit while its group is still open
    last_edit: Option<EditType>,
}

impl<T> UndoStack<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            undos: VecDeque::new(),
            redos: Vec::new(),
            limit,
            last_edit: None,
        }
    }

    /// Whether an edit of `kind` made now would open a new group
    #[must_use]
    pub fn starts_group(&self, kind: EditType) -> bool {
        self.last_edit
            .map_or(true, |previous| kind.breaks_undo_group(previous))
    }

    /// Record an edit of `kind`. `before` is the state from before the edit;
    /// it is kept only when the edit opens a new group, so callers pass `None`
    /// when [`UndoStack::starts_group`] says the edit joins the open one.
    /// Returns true if the edit started a new group.
    pub fn record(&mut self, kind: EditType, before: Option<T>) -> bool {
        self.redos.clear();
        let starts_group = self.starts_group(kind);
        self.last_edit = Some(kind);
        let Some(before) = before.filter(|_| starts_group) else {
            return false;
        };

        self.undos.push_back(before);
        while self.undos.len() > self.limit {
            self.undos.pop_front();
        }
        true
    }

    /// Close the open group so the next edit starts a new one
    pub fn break_group(&mut self) {
        self.last_edit = None;
    }

    /// Step back: returns the state to restore, storing `current` for redo
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undos.pop_back()?;
        self.redos.push(current);
        self.last_edit = None;
        Some(previous)
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redos.pop()?;
        self.undos.push_back(current);
        self.last_edit = None;
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }

    /// Number of undo groups held
    pub fn len(&self) -> usize {
        self.undos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undos.is_empty()
    }

    /// Change the bound, dropping the oldest groups if needed
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        while self.undos.len() > limit {
            self.undos.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.undos.clear();
        self.redos.clear();
        self.last_edit = None;
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

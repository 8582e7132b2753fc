//! Document management
//! Line store plus undo history. Every text change goes through [`Document::edit`]
//! so history and invalidation cannot drift apart.

use crate::lines::{LineRange, LineStore, Snapshot};
use crate::undo::{EditType, UndoStack};
use crate::update::UpdateBuilder;

#[derive(Debug, Clone)]
pub struct Document {
    lines: LineStore,
    history: UndoStack<Snapshot>,
}

impl Document {
    /// Create an empty document
    pub fn new(undo_limit: usize) -> Self {
        Self {
            lines: LineStore::new(),
            history: UndoStack::new(undo_limit),
        }
    }

    pub fn lines(&self) -> &LineStore {
        &self.lines
    }

    /// Apply a text edit. Records undo state and reports invalidation only if
    /// `f` reports a change. Returns whether anything changed.
    ///
    /// The document is only snapshotted when the edit opens a new undo group;
    /// typing into an open group costs nothing extra.
    pub fn edit<F>(&mut self, kind: EditType, update: &mut UpdateBuilder, f: F) -> bool
    where
        F: FnOnce(&mut LineStore) -> Option<LineRange>,
    {
        let before = self
            .history
            .starts_group(kind)
            .then(|| self.lines.snapshot());
        let Some(range) = f(&mut self.lines) else {
            return false;
        };
        self.history.record(kind, before);
        update.invalidate(Some(range));
        update.text_changed();
        update.scroll_to(self.lines.caret());
        true
    }

    /// Change the caret or selection without touching text.
    /// A real movement closes the open undo group.
    pub fn select<F>(&mut self, update: &mut UpdateBuilder, f: F) -> bool
    where
        F: FnOnce(&mut LineStore) -> Option<LineRange>,
    {
        let Some(range) = f(&mut self.lines) else {
            return false;
        };
        self.history.break_group();
        update.invalidate(Some(range));
        update.scroll_to(self.lines.caret());
        true
    }

    /// Replace the whole text as one undoable edit
    pub fn set_text(&mut self, text: &str, update: &mut UpdateBuilder) -> bool {
        self.edit(EditType::Other, update, |lines| lines.replace_all(text))
    }

    pub fn undo(&mut self, update: &mut UpdateBuilder) -> bool {
        let current = self.lines.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous, update);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self, update: &mut UpdateBuilder) -> bool {
        let current = self.lines.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next, update);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Snapshot, update: &mut UpdateBuilder) {
        update.invalidate(self.lines.restore(snapshot));
        update.text_changed();
        update.scroll_to(self.lines.caret());
    }

    pub fn break_undo_group(&mut self) {
        self.history.break_group();
    }

    pub fn set_undo_limit(&mut self, limit: usize) {
        self.history.set_limit(limit);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of undo groups held
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }
}

//! Modal input dispatch
//!
//! Resolves key presses against the active mode's bindings:
//! - a complete binding runs its [`Action`] (buffer edit, mode change or host action)
//! - a key that only starts a longer binding stays pending behind a timer;
//!   the next key either completes the sequence or flushes it
//! - an unbound key passes through (self-inserts in insert mode)
//!
//! Outside insert mode, digits before a command form a repeat count (`3j`, `d2w`).
//! A leading `0` is the start-of-line motion, not a count.

use crate::action::{Action, EditCommand, InsertEntry, Motion, Operator};
use crate::config::SessionConfig;
use crate::document::Document;
use crate::host::EventPayload;
use crate::key::{Key, KeyDescriptor};
use crate::keymap::trie::MatchResult;
use crate::keymap::{KeyContext, KeyMap};
use crate::lines::{LineRange, LineStore, Position};
use crate::mode::Mode;
use crate::timers::{TimerPurpose, TimerRegistry, TimerToken};
use crate::undo::EditType;
use crate::update::UpdateBuilder;

/// Session state a dispatch step works on
pub struct DispatchContext<'a> {
    pub doc: &'a mut Document,
    pub timers: &'a mut TimerRegistry,
    pub config: &'a SessionConfig,
    pub update: &'a mut UpdateBuilder,
}

/// Owned outcome of a keymap lookup
enum Resolution {
    Complete(Action),
    Pending,
    Unbound,
}

fn merge(a: Option<LineRange>, b: Option<LineRange>) -> Option<LineRange> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, b) => a.or(b),
    }
}

pub struct Dispatcher {
    keymap: KeyMap,
    mode: Mode,
    /// Keys of an incomplete multi-key binding
    pending: Vec<KeyDescriptor>,
    count: Option<usize>,
    /// Operator waiting for its motion, with the count typed before it
    operator: Option<(Operator, usize)>,
    /// Every key of the command in progress (counts, operator, pending keys)
    command_keys: Vec<KeyDescriptor>,
    /// Last `parse_state` reported to the host
    reported_state: String,
}

impl Dispatcher {
    pub fn new(keymap: KeyMap, mode: Mode) -> Self {
        Self {
            keymap,
            mode,
            pending: Vec::new(),
            count: None,
            operator: None,
            command_keys: Vec::new(),
            reported_state: String::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn pending_keys(&self) -> &[KeyDescriptor] {
        &self.pending
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    /// Whether a sequence, count or operator is in progress
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || self.count.is_some() || self.operator.is_some()
    }

    /// Resolve one key press. Returns whether the key was handled.
    pub fn handle_key(
        &mut self,
        key: KeyDescriptor,
        payload: EventPayload,
        cx: &mut DispatchContext<'_>,
    ) -> bool {
        let handled = self.process(key, payload, cx);
        self.report_parse_state(cx.update);
        handled
    }

    /// A timer came back. `None` for dead or unknown tokens, otherwise whether
    /// resolving it did anything.
    pub fn fire_timer(&mut self, token: TimerToken, cx: &mut DispatchContext<'_>) -> Option<bool> {
        let timer = cx.timers.fire(token)?;
        let handled = match timer.purpose {
            TimerPurpose::PendingSequence => {
                tracing::debug!(token, keys = self.pending.len(), "pending sequence timed out");
                self.resolve_pending(cx)
            }
        };
        self.report_parse_state(cx.update);
        Some(handled)
    }

    /// Abort any sequence, count or operator in progress. A no-op when idle.
    pub fn clear_pending(&mut self, cx: &mut DispatchContext<'_>) {
        if !self.has_pending() {
            return;
        }
        self.cancel_sequence_timer(cx);
        self.pending.clear();
        self.count = None;
        self.command_keys.clear();
        if self.operator.is_some() {
            self.set_mode(Mode::Normal, cx);
        }
        self.report_parse_state(cx.update);
    }

    /// Switch modes, reporting `mode_change` if the mode actually changes
    pub fn set_mode(&mut self, mode: Mode, cx: &mut DispatchContext<'_>) {
        if mode != Mode::OperatorPending {
            self.operator = None;
        }
        if self.mode == mode {
            return;
        }
        if self.mode == Mode::Visual {
            cx.doc.select(cx.update, LineStore::collapse_selection);
        }
        tracing::debug!(from = %self.mode, to = %mode, "mode change");
        self.mode = mode;
        cx.doc.break_undo_group();
        cx.update.mode_change(mode);
    }

    fn process(
        &mut self,
        key: KeyDescriptor,
        payload: EventPayload,
        cx: &mut DispatchContext<'_>,
    ) -> bool {
        if self.pending.is_empty() {
            if let Some(digit) = self.count_digit(key) {
                self.count = Some(
                    self.count
                        .unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(digit),
                );
                self.command_keys.push(key);
                return true;
            }
        }

        self.pending.push(key);
        let resolution = match self.keymap.lookup(KeyContext::from(self.mode), &self.pending) {
            MatchResult::Exact(action) => Resolution::Complete(action.clone()),
            MatchResult::Prefix | MatchResult::Ambiguous(_) => Resolution::Pending,
            MatchResult::None => Resolution::Unbound,
        };

        match resolution {
            Resolution::Complete(action) => {
                self.cancel_sequence_timer(cx);
                self.pending.clear();
                self.command_keys.push(key);
                self.execute(action, cx);
                true
            }
            Resolution::Pending => {
                self.command_keys.push(key);
                let delay_ms = cx.config.key_timeout_ms;
                let scheduled = cx
                    .timers
                    .schedule(TimerPurpose::PendingSequence, payload, delay_ms);
                if let Some(old) = scheduled.superseded {
                    cx.update.cancel_timer(old);
                }
                cx.update.set_timer(scheduled.token, payload, delay_ms);
                true
            }
            Resolution::Unbound if self.pending.len() > 1 => {
                // The new key breaks the sequence: settle what came before, then retry it alone
                self.pending.pop();
                self.cancel_sequence_timer(cx);
                self.resolve_pending(cx);
                self.process(key, payload, cx)
            }
            Resolution::Unbound => {
                self.pending.clear();
                self.fallback(key, cx)
            }
        }
    }

    /// Digit value if `key` extends a count in the current state
    fn count_digit(&self, key: KeyDescriptor) -> Option<usize> {
        if self.mode == Mode::Insert || !key.modifiers.is_empty() {
            return None;
        }
        match key.key {
            Key::Char('0') if self.count.is_none() => None,
            Key::Char(c) => c.to_digit(10).map(|d| d as usize),
            _ => None,
        }
    }

    /// A single key with no binding
    fn fallback(&mut self, key: KeyDescriptor, cx: &mut DispatchContext<'_>) -> bool {
        match self.mode {
            Mode::Insert => match key.printable() {
                Some(c) => {
                    let mut buf = [0u8; 4];
                    self.insert_text(c.encode_utf8(&mut buf), cx);
                    true
                }
                None => {
                    tracing::debug!(%key, "unbound key passed through");
                    false
                }
            },
            Mode::OperatorPending => {
                tracing::debug!(%key, "operator aborted by unbound key");
                self.finish_command();
                self.set_mode(Mode::Normal, cx);
                false
            }
            Mode::Normal | Mode::Visual => {
                tracing::debug!(%key, mode = %self.mode, "unbound key passed through");
                self.finish_command();
                false
            }
        }
    }

    /// Settle the pending keys without a continuation: run the shorter binding
    /// if there is one, otherwise insert them (insert mode) or drop them.
    /// Returns false when the keys were dropped.
    fn resolve_pending(&mut self, cx: &mut DispatchContext<'_>) -> bool {
        let keys = std::mem::take(&mut self.pending);
        if keys.is_empty() {
            return false;
        }

        let action = match self.keymap.lookup(KeyContext::from(self.mode), &keys) {
            MatchResult::Ambiguous(action) => Some(action.clone()),
            _ => None,
        };
        if let Some(action) = action {
            self.execute(action, cx);
            return true;
        }

        match self.mode {
            Mode::Insert => {
                let text: String = keys.iter().filter_map(KeyDescriptor::printable).collect();
                if !text.is_empty() {
                    self.insert_text(&text, cx);
                }
                self.finish_command();
                !text.is_empty()
            }
            Mode::OperatorPending => {
                self.finish_command();
                self.set_mode(Mode::Normal, cx);
                false
            }
            Mode::Normal | Mode::Visual => {
                self.finish_command();
                false
            }
        }
    }

    fn cancel_sequence_timer(&mut self, cx: &mut DispatchContext<'_>) {
        if let Some(token) = cx.timers.cancel_purpose(TimerPurpose::PendingSequence) {
            cx.update.cancel_timer(token);
        }
    }

    /// The command in progress is done; drop its count and keys
    fn finish_command(&mut self) {
        self.count = None;
        self.command_keys.clear();
    }

    fn report_parse_state(&mut self, update: &mut UpdateBuilder) {
        let state: String = self.command_keys.iter().map(ToString::to_string).collect();
        if state != self.reported_state {
            update.parse_state(state.clone());
            self.reported_state = state;
        }
    }

    fn insert_text(&mut self, text: &str, cx: &mut DispatchContext<'_>) {
        cx.doc
            .edit(EditType::InsertChars, cx.update, |lines| lines.insert_str(text));
    }

    // =========================================================================
    // Action execution
    // =========================================================================

    fn execute(&mut self, action: Action, cx: &mut DispatchContext<'_>) {
        tracing::trace!(?action, mode = %self.mode, count = ?self.count, "execute");
        match action {
            Action::Move(motion) => self.run_motion(motion, cx),
            Action::Edit(command) => self.run_edit(command, cx),
            Action::Operator(op) => {
                let count = self.count.take().unwrap_or(1);
                self.operator = Some((op, count));
                self.set_mode(Mode::OperatorPending, cx);
                // The operator keys stay in the parse state until its motion arrives
                return;
            }
            Action::Linewise => self.run_linewise(cx),
            Action::Insert(entry) => self.enter_insert(entry, cx),
            Action::EnterMode(mode) => self.set_mode(mode, cx),
            Action::Host(name) => {
                if self.mode == Mode::OperatorPending {
                    self.set_mode(Mode::Normal, cx);
                }
                cx.update.action(name);
            }
            Action::Noop => {}
        }
        self.finish_command();
    }

    fn run_motion(&mut self, motion: Motion, cx: &mut DispatchContext<'_>) {
        let explicit = self.count.take();
        if let Some((op, op_count)) = self.operator.take() {
            let count = op_count.saturating_mul(explicit.unwrap_or(1));
            let target = Self::destination(cx.doc.lines(), motion, count, explicit);
            self.apply_operator(op, motion, target, cx);
            self.set_mode(Mode::Normal, cx);
            return;
        }

        let extend = self.mode == Mode::Visual;
        let count = explicit.unwrap_or(1);
        cx.doc.select(cx.update, |lines| match (motion, explicit) {
            (Motion::StartOfFile | Motion::EndOfFile, Some(line)) => {
                lines.set_caret(Position::new(line.saturating_sub(1), 0), extend)
            }
            _ => lines.repeat_motion(motion, count, extend),
        });
    }

    /// Where a counted motion lands; `nG` and `ngg` jump to line n
    fn destination(
        lines: &LineStore,
        motion: Motion,
        count: usize,
        explicit: Option<usize>,
    ) -> Position {
        match (motion, explicit) {
            (Motion::StartOfFile | Motion::EndOfFile, Some(line)) => {
                lines.clamp(Position::new(line.saturating_sub(1), 0))
            }
            _ => lines.repeated_target(motion, count),
        }
    }

    fn apply_operator(
        &mut self,
        op: Operator,
        motion: Motion,
        target: Position,
        cx: &mut DispatchContext<'_>,
    ) {
        let caret = cx.doc.lines().caret();
        if motion.is_linewise() {
            self.apply_linewise(op, caret.line, target.line, cx);
            return;
        }

        let (start, mut end) = (caret.min(target), caret.max(target));
        if motion == Motion::NextWord && end.line > start.line {
            // `dw` on the last word stops at the end of the line
            end = Position::new(start.line, cx.doc.lines().line_len(start.line));
        }
        if start == end {
            return;
        }

        let text = cx.doc.lines().text_between(start, end);
        cx.update.pasteboard(text);
        match op {
            Operator::Delete => {
                cx.doc
                    .edit(EditType::Delete, cx.update, |lines| lines.delete_range(start, end));
            }
            Operator::Yank => {
                cx.doc
                    .select(cx.update, |lines| lines.set_caret(start, false));
            }
        }
    }

    fn apply_linewise(
        &mut self,
        op: Operator,
        from: usize,
        to: usize,
        cx: &mut DispatchContext<'_>,
    ) {
        let (first, last) = (from.min(to), from.max(to));
        let text = cx.doc.lines().lines_text(first, last);
        cx.update.pasteboard(text);
        match op {
            Operator::Delete => {
                cx.doc
                    .edit(EditType::Other, cx.update, |lines| lines.delete_lines(first, last));
            }
            Operator::Yank => {
                let col = cx.doc.lines().caret().col;
                cx.doc
                    .select(cx.update, |lines| lines.set_caret(Position::new(first, col), false));
            }
        }
    }

    /// `dd`, `3yy`: the operator applied to whole lines from the caret down
    fn run_linewise(&mut self, cx: &mut DispatchContext<'_>) {
        let Some((op, op_count)) = self.operator.take() else {
            return;
        };
        let count = op_count.saturating_mul(self.count.take().unwrap_or(1));
        let first = cx.doc.lines().caret().line;
        let last = first.saturating_add(count - 1);
        self.apply_linewise(op, first, last, cx);
        self.set_mode(Mode::Normal, cx);
    }

    fn run_edit(&mut self, command: EditCommand, cx: &mut DispatchContext<'_>) {
        match command {
            EditCommand::InsertNewline => {
                cx.doc
                    .edit(EditType::InsertBreak, cx.update, |lines| lines.insert_str("\n"));
            }
            EditCommand::InsertTab => {
                let text = cx.config.tab_text(cx.doc.lines().caret().col);
                cx.doc
                    .edit(EditType::InsertBreak, cx.update, |lines| lines.insert_str(&text));
            }
            EditCommand::DeleteBackward => {
                cx.doc
                    .edit(EditType::Delete, cx.update, LineStore::delete_backward);
            }
            EditCommand::DeleteForward if self.mode == Mode::Normal => {
                // `3x` deletes up to three characters without leaving the line
                let count = self.count.take().unwrap_or(1);
                let caret = cx.doc.lines().caret();
                let len = cx.doc.lines().line_len(caret.line);
                let end = Position::new(caret.line, caret.col.saturating_add(count).min(len));
                cx.doc
                    .edit(EditType::Delete, cx.update, |lines| lines.delete_range(caret, end));
            }
            EditCommand::DeleteForward => {
                cx.doc
                    .edit(EditType::Delete, cx.update, LineStore::delete_forward);
            }
            EditCommand::DeleteWordBackward => {
                cx.doc.edit(EditType::Delete, cx.update, |lines| {
                    lines.delete_to(Motion::PreviousWord)
                });
            }
            EditCommand::Transpose => {
                cx.doc.edit(EditType::Other, cx.update, LineStore::transpose);
            }
            EditCommand::ToggleComment => {
                let config = cx.config;
                cx.doc.edit(EditType::Other, cx.update, |lines| {
                    lines.toggle_comment(&config.comment_token)
                });
                if self.mode == Mode::Visual {
                    self.set_mode(Mode::Normal, cx);
                }
            }
            EditCommand::DeleteSelection => {
                let text = cx.doc.lines().selected_text();
                if !text.is_empty() {
                    cx.update.pasteboard(text);
                }
                cx.doc
                    .edit(EditType::Delete, cx.update, LineStore::delete_selection);
                self.set_mode(Mode::Normal, cx);
            }
            EditCommand::YankSelection => {
                let text = cx.doc.lines().selected_text();
                if !text.is_empty() {
                    cx.update.pasteboard(text);
                }
                let (start, _) = cx.doc.lines().selection();
                cx.doc
                    .select(cx.update, |lines| lines.set_caret(start, false));
                self.set_mode(Mode::Normal, cx);
            }
        }
    }

    fn enter_insert(&mut self, entry: InsertEntry, cx: &mut DispatchContext<'_>) {
        match entry {
            InsertEntry::Before => {}
            InsertEntry::After => {
                cx.doc
                    .select(cx.update, |lines| lines.move_caret(Motion::Right, false));
            }
            InsertEntry::EndOfLine => {
                cx.doc
                    .select(cx.update, |lines| lines.move_caret(Motion::EndOfLine, false));
            }
            InsertEntry::OpenBelow => {
                cx.doc.edit(EditType::InsertBreak, cx.update, |lines| {
                    let moved = lines.move_caret(Motion::EndOfLine, false);
                    merge(moved, lines.insert_str("\n"))
                });
            }
            InsertEntry::OpenAbove => {
                cx.doc.edit(EditType::InsertBreak, cx.update, |lines| {
                    let moved = lines.move_caret(Motion::StartOfLine, false);
                    let inserted = merge(moved, lines.insert_str("\n"));
                    merge(inserted, lines.move_caret(Motion::Up, false))
                });
            }
        }
        self.set_mode(Mode::Insert, cx);
    }
}

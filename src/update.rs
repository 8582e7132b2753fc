//! Effects of one engine operation
//!
//! Dispatch and protocol handlers never call the host directly. They record
//! what happened into an [`UpdateBuilder`]; the session flushes the finished
//! [`Update`] once, so a single operation yields at most one `invalidate`.

use crate::host::EventPayload;
use crate::lines::{LineRange, Position};
use crate::mode::Mode;
use crate::timers::TimerToken;

/// Timer work the host must perform, in request order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    Set {
        token: TimerToken,
        payload: EventPayload,
        delay_ms: u32,
    },
    Cancel(TimerToken),
}

/// Everything one operation wants the host to know about
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub invalidate: Option<LineRange>,
    pub scroll_to: Option<Position>,
    pub mode_change: Option<Mode>,
    /// New pending-key text; `Some("")` once a sequence is cleared
    pub parse_state: Option<String>,
    pub pasteboard: Option<String>,
    pub actions: Vec<String>,
    pub timers: Vec<TimerRequest>,
    /// Text changed, so the content size may have too
    pub text_changed: bool,
    /// Line layout changed without a text edit, e.g. a rewrap
    pub layout_changed: bool,
}

impl Update {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Update::default()
    }
}

#[derive(Debug, Default)]
pub struct UpdateBuilder {
    update: Update,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen the pending invalidation. `None` is ignored.
    pub fn invalidate(&mut self, range: Option<LineRange>) {
        if let Some(range) = range {
            self.update.invalidate = Some(match self.update.invalidate {
                Some(existing) => existing.union(range),
                None => range,
            });
        }
    }

    pub fn scroll_to(&mut self, pos: Position) {
        self.update.scroll_to = Some(pos);
    }

    pub fn mode_change(&mut self, mode: Mode) {
        self.update.mode_change = Some(mode);
    }

    pub fn parse_state(&mut self, state: impl Into<String>) {
        self.update.parse_state = Some(state.into());
    }

    pub fn pasteboard(&mut self, text: impl Into<String>) {
        self.update.pasteboard = Some(text.into());
    }

    pub fn action(&mut self, name: impl Into<String>) {
        self.update.actions.push(name.into());
    }

    pub fn set_timer(&mut self, token: TimerToken, payload: EventPayload, delay_ms: u32) {
        self.update.timers.push(TimerRequest::Set {
            token,
            payload,
            delay_ms,
        });
    }

    pub fn cancel_timer(&mut self, token: TimerToken) {
        self.update.timers.push(TimerRequest::Cancel(token));
    }

    pub fn text_changed(&mut self) {
        self.update.text_changed = true;
    }

    pub fn layout_changed(&mut self) {
        self.update.layout_changed = true;
    }

    pub fn has_invalidation(&self) -> bool {
        self.update.invalidate.is_some()
    }

    pub fn finish(self) -> Update {
        self.update
    }
}

//! Session façade
//!
//! A [`Session`] is the one object a host holds. It owns the document, the
//! modal dispatcher and the timer registry, and reports every effect through
//! the [`HostCallbacks`] it was created with.
//!
//! ## Callback order
//!
//! Each entry point collects its effects first and then flushes them in a
//! fixed order:
//! 1. `set_timer` / `cancel_timer`, in request order
//! 2. at most one `invalidate`
//! 3. notifications: `mode_change`, `parse_state`, `set_pasteboard`, `scroll_to`,
//!    then `content_size` if the measured document size changed
//!    (after an edit or a rewrap)
//! 4. `action` callbacks
//! 5. the request reply (`send_message`) or `event` (`handle_input`, `fire_timer`)

use serde_json::{json, Value};

use crate::action::Motion;
use crate::config::settings::{create_settings_registry, SettingsRegistry};
use crate::config::SessionConfig;
use crate::constants::{errors, limits, notifications};
use crate::dispatch::{DispatchContext, Dispatcher};
use crate::document::Document;
use crate::error::{Result, WeftError};
use crate::host::{EventPayload, HostCallbacks};
use crate::key::KeyDescriptor;
use crate::lines::{Line, LineRange, LineStore, Position};
use crate::measure::{TextSize, WidthCache};
use crate::mode::Mode;
use crate::rpc::{self, RpcMessage};
use crate::timers::{TimerRegistry, TimerToken};
use crate::undo::EditType;
use crate::update::{TimerRequest, Update, UpdateBuilder};
use crate::wrap::WrapMap;

pub struct Session<H: HostCallbacks> {
    host: H,
    doc: Document,
    dispatcher: Dispatcher,
    timers: TimerRegistry,
    widths: WidthCache,
    wraps: WrapMap,
    config: SessionConfig,
    settings: SettingsRegistry,
    /// Last size reported through `content_size`
    content_size: Option<TextSize>,
    /// Last `viewport_change` from the host
    viewport: Option<TextSize>,
    torn_down: bool,
}

impl<H: HostCallbacks> Session<H> {
    /// Create a session with one empty line
    pub fn new(host: H, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let keymap = config.build_keymap()?;
        tracing::debug!(
            mode = %config.default_mode,
            timeout_ms = config.key_timeout_ms,
            "session created"
        );
        Ok(Self {
            host,
            doc: Document::new(config.undo_limit),
            dispatcher: Dispatcher::new(keymap, config.default_mode),
            timers: TimerRegistry::new(),
            widths: WidthCache::new(),
            wraps: WrapMap::new(),
            config,
            settings: create_settings_registry(),
            content_size: None,
            viewport: None,
            torn_down: false,
        })
    }

    // --- Queries ---

    /// Copy of line `index`, or `None` when `index >= line_count()`
    pub fn get_line(&self, index: usize) -> Option<Line> {
        let mut line = self.doc.lines().get_line(index)?;
        line.wraps = self.wraps.breaks(index).to_vec();
        Some(line)
    }

    pub fn line_count(&self) -> usize {
        self.doc.lines().line_count()
    }

    pub fn text(&self) -> String {
        self.doc.lines().text()
    }

    pub fn caret(&self) -> Position {
        self.doc.lines().caret()
    }

    pub fn mode(&self) -> Mode {
        self.dispatcher.mode()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn viewport(&self) -> Option<TextSize> {
        self.viewport
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // --- Input ---

    /// Dispatch one key press for the line the host's caret is on.
    ///
    /// Emits `event(payload, handled)` exactly once. A line index outside the
    /// document is a host integration bug: nothing is applied, no callbacks
    /// fire, and the error is returned.
    pub fn handle_input(&mut self, line: usize, key: KeyDescriptor, payload: EventPayload) -> Result<()> {
        self.check_line(line)?;

        let mut update = UpdateBuilder::new();
        let handled = {
            let mut cx = DispatchContext {
                doc: &mut self.doc,
                timers: &mut self.timers,
                config: &self.config,
                update: &mut update,
            };
            self.dispatcher.handle_key(key, payload, &mut cx)
        };
        tracing::debug!(%key, handled, mode = %self.dispatcher.mode(), "key dispatched");

        self.flush(update.finish());
        self.host.event(&payload, handled);
        Ok(())
    }

    /// [`Session::handle_input`] for a key as the host reports it: typed
    /// characters or a key name, plus a modifier bitmask. Keys that cannot be
    /// interpreted pass through.
    pub fn handle_key_event(
        &mut self,
        line: usize,
        characters: &str,
        modifier_mask: u32,
        payload: EventPayload,
    ) -> Result<()> {
        self.check_line(line)?;
        match KeyDescriptor::from_host(characters, modifier_mask) {
            Ok(key) => self.handle_input(line, key, payload),
            Err(err) => {
                tracing::debug!(%err, "uninterpretable key passed through");
                self.host.event(&payload, false);
                Ok(())
            }
        }
    }

    /// Abort a pending key sequence, e.g. on focus loss. A no-op when idle.
    pub fn clear_pending(&mut self, line: usize) -> Result<()> {
        self.check_line(line)?;
        let mut update = UpdateBuilder::new();
        {
            let mut cx = DispatchContext {
                doc: &mut self.doc,
                timers: &mut self.timers,
                config: &self.config,
                update: &mut update,
            };
            self.dispatcher.clear_pending(&mut cx);
        }
        self.flush(update.finish());
        Ok(())
    }

    /// A timer the engine asked for has elapsed.
    /// Live tokens resolve like an input event and report whether the resolved
    /// sequence did anything; dead or unknown ones are ignored.
    pub fn fire_timer(&mut self, token: TimerToken, payload: EventPayload) {
        let mut update = UpdateBuilder::new();
        let outcome = {
            let mut cx = DispatchContext {
                doc: &mut self.doc,
                timers: &mut self.timers,
                config: &self.config,
                update: &mut update,
            };
            self.dispatcher.fire_timer(token, &mut cx)
        };
        let Some(handled) = outcome else {
            return;
        };
        tracing::debug!(token, handled, "timer resolved");
        self.flush(update.finish());
        self.host.event(&payload, handled);
    }

    // --- Protocol ---

    /// Apply one protocol message. Requests get exactly one reply through `rpc_out`.
    pub fn send_message(&mut self, json: &str) {
        let message = match RpcMessage::parse(json) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(%err, "rejected message");
                let id = rpc::request_id(json);
                self.host.rpc_out(&rpc::error_response(id.as_ref(), &err));
                return;
            }
        };

        let mut update = UpdateBuilder::new();
        let result = self.apply_message(&message, &mut update);
        self.flush(update.finish());

        match (message.id.as_ref(), result) {
            (Some(id), Ok(value)) => self.host.rpc_out(&rpc::response(id, value)),
            (None, Ok(_)) => {}
            (id, Err(err)) => {
                tracing::warn!(method = %message.method, %err, "message failed");
                self.host.rpc_out(&rpc::error_response(id, &err));
            }
        }
    }

    fn apply_message(&mut self, message: &RpcMessage, update: &mut UpdateBuilder) -> Result<Value> {
        tracing::trace!(method = %message.method, "message");
        match message.method.as_str() {
            "insert" => {
                let params: rpc::InsertParams = message.params()?;
                self.doc
                    .edit(EditType::InsertChars, update, |l| l.insert_str(&params.chars));
            }
            "insert_newline" => {
                self.doc
                    .edit(EditType::InsertBreak, update, |l| l.insert_str("\n"));
            }
            "insert_tab" => {
                let text = self.config.tab_text(self.doc.lines().caret().col);
                self.doc
                    .edit(EditType::InsertBreak, update, |l| l.insert_str(&text));
            }
            "delete_backward" => {
                self.doc.edit(EditType::Delete, update, LineStore::delete_backward);
            }
            "delete_forward" => {
                self.doc.edit(EditType::Delete, update, LineStore::delete_forward);
            }
            "delete_to_beginning_of_line" => {
                self.doc
                    .edit(EditType::Delete, update, |l| l.delete_to(Motion::StartOfLine));
            }
            "delete_to_end_of_line" => {
                self.doc
                    .edit(EditType::Delete, update, |l| l.delete_to(Motion::EndOfLine));
            }
            "delete_word_backward" => {
                self.doc
                    .edit(EditType::Delete, update, |l| l.delete_to(Motion::PreviousWord));
            }
            "transpose" => {
                self.doc.edit(EditType::Other, update, LineStore::transpose);
            }
            "toggle_comment" => {
                let token = &self.config.comment_token;
                self.doc
                    .edit(EditType::Other, update, |l| l.toggle_comment(token));
            }
            "select_all" => {
                self.doc.select(update, LineStore::select_all);
            }
            "collapse_selections" => {
                self.doc.select(update, LineStore::collapse_selection);
            }
            "copy" => {
                let text = self.doc.lines().selected_text();
                if !text.is_empty() {
                    update.pasteboard(text.clone());
                }
                return Ok(Value::String(text));
            }
            "cut" => {
                let text = self.doc.lines().selected_text();
                if !text.is_empty() {
                    update.pasteboard(text.clone());
                    self.doc
                        .edit(EditType::Delete, update, LineStore::delete_selection);
                }
                return Ok(Value::String(text));
            }
            "undo" => {
                self.doc.undo(update);
            }
            "redo" => {
                self.doc.redo(update);
            }
            "set_text" => {
                let params: rpc::SetTextParams = message.params()?;
                self.doc.set_text(&params.text, update);
            }
            "gesture" => {
                let params: rpc::GestureParams = message.params()?;
                self.gesture(params, update);
            }
            "viewport_change" => {
                let params: rpc::ViewportParams = message.params()?;
                self.viewport = Some(TextSize::new(params.width, params.height));
                self.widths.clear();
                if self.config.word_wrap && self.wraps.width() != Some(params.width) {
                    self.rewrap(params.width, update);
                }
                update.scroll_to(self.doc.lines().caret());
            }
            "set_option" => {
                let params: rpc::SetOptionParams = message.params()?;
                let name = self
                    .settings
                    .apply(&params.name, &params.value, &mut self.config)?;
                self.option_changed(name, update);
                return Ok(json!(name));
            }
            "set_mode" => {
                let params: rpc::SetModeParams = message.params()?;
                let mode: Mode = params.mode.parse().map_err(|e: WeftError| {
                    WeftError::protocol(errors::INVALID_PARAMS, e.message)
                })?;
                let mut cx = DispatchContext {
                    doc: &mut self.doc,
                    timers: &mut self.timers,
                    config: &self.config,
                    update: &mut *update,
                };
                self.dispatcher.clear_pending(&mut cx);
                self.dispatcher.set_mode(mode, &mut cx);
            }
            "line_count" => return Ok(json!(self.line_count())),
            "get_line" => {
                let params: rpc::GetLineParams = message.params()?;
                return Ok(serde_json::to_value(self.get_line(params.index))?);
            }
            "get_text" => return Ok(Value::String(self.text())),
            method => {
                let (base, extend) = match method.strip_suffix("_and_modify_selection") {
                    Some(base) => (base, true),
                    None => (method, false),
                };
                if let Some(motion) = rpc::page_motion_for_method(base) {
                    let rows = self.page_rows();
                    self.doc
                        .select(update, |l| l.repeat_motion(motion, rows, extend));
                    return Ok(Value::Null);
                }
                let motion = rpc::motion_for_method(base).ok_or_else(|| {
                    WeftError::protocol(errors::UNKNOWN_METHOD, format!("Unknown method: {method}"))
                })?;
                self.doc.select(update, |l| l.move_caret(motion, extend));
            }
        }
        Ok(Value::Null)
    }

    fn gesture(&mut self, params: rpc::GestureParams, update: &mut UpdateBuilder) {
        let pos = Position::new(params.line, params.col);
        match params.ty {
            rpc::GestureType::PointSelect => {
                self.doc.select(update, |l| l.set_caret(pos, false));
            }
            rpc::GestureType::RangeSelect => {
                self.doc.select(update, |l| l.set_caret(pos, true));
            }
            rpc::GestureType::WordSelect => {
                self.doc.select(update, |l| l.select_word_at(pos));
            }
            rpc::GestureType::LineSelect => {
                self.doc.select(update, |l| l.select_line(params.line));
            }
        }
    }

    /// Push a runtime setting change into the parts that cache it
    fn option_changed(&mut self, name: &str, update: &mut UpdateBuilder) {
        tracing::debug!(option = name, "option changed");
        match name {
            "undo_limit" => self.doc.set_undo_limit(self.config.undo_limit),
            "word_wrap" => match (self.config.word_wrap, self.viewport) {
                (true, Some(viewport)) if !self.wraps.is_enabled() => {
                    self.rewrap(viewport.width, update);
                }
                (false, _) if self.wraps.is_enabled() => {
                    self.wraps.disable();
                    update.invalidate(Some(LineRange::ALL));
                    update.layout_changed();
                }
                _ => {}
            },
            _ => {}
        }
    }

    /// Wrap the whole document at `width`; every line's layout may have moved
    fn rewrap(&mut self, width: f64, update: &mut UpdateBuilder) {
        let host = &self.host;
        self.wraps
            .rewrap_all(width, self.doc.lines(), &mut self.widths, |text| host.measure_text(text));
        update.invalidate(Some(LineRange::ALL));
        update.layout_changed();
    }

    /// Lines one page motion covers: whole rows that fit the viewport
    fn page_rows(&mut self) -> usize {
        let Some(viewport) = self.viewport else {
            return limits::DEFAULT_PAGE_ROWS;
        };
        let host = &self.host;
        let line_height = self.widths.line_height(|text| host.measure_text(text));
        if line_height <= 0.0 {
            return limits::DEFAULT_PAGE_ROWS;
        }
        ((viewport.height / line_height).floor() as usize).max(1)
    }

    // --- Teardown ---

    /// End the session, cancelling every live timer through `cancel_timer`
    pub fn destroy(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        for token in self.timers.drain() {
            self.host.cancel_timer(token);
        }
        tracing::debug!("session destroyed");
    }

    // --- Internals ---

    fn check_line(&self, line: usize) -> Result<()> {
        let count = self.line_count();
        if line >= count {
            let err = WeftError::line_out_of_range(line, count);
            tracing::error!(%err, "host and engine disagree about the document");
            return Err(err);
        }
        Ok(())
    }

    fn notify(&mut self, method: &str, params: Value) {
        self.host.rpc_out(&rpc::notification(method, params));
    }

    fn flush(&mut self, update: Update) {
        for request in update.timers {
            match request {
                TimerRequest::Set {
                    token,
                    payload,
                    delay_ms,
                } => self.host.set_timer(token, &payload, delay_ms),
                TimerRequest::Cancel(token) => self.host.cancel_timer(token),
            }
        }

        if let Some(range) = update.invalidate {
            self.host.invalidate(range);
        }

        if let Some(mode) = update.mode_change {
            self.notify(notifications::MODE_CHANGE, json!({ "mode": mode.as_str() }));
        }
        if let Some(state) = update.parse_state {
            self.notify(notifications::PARSE_STATE, json!({ "state": state }));
        }
        if let Some(text) = update.pasteboard {
            self.notify(notifications::SET_PASTEBOARD, json!({ "text": text }));
        }
        if let Some(pos) = update.scroll_to {
            self.notify(notifications::SCROLL_TO, json!({ "line": pos.line, "col": pos.col }));
        }
        if update.text_changed {
            if let Some(range) = update.invalidate {
                let host = &self.host;
                self.wraps
                    .update(self.doc.lines(), range, &mut self.widths, |text| host.measure_text(text));
            }
        }
        if update.text_changed || update.layout_changed {
            self.refresh_content_size();
        }

        for name in update.actions {
            self.host.action(&name);
        }
    }

    /// Report the document size; with wrapping on, rows rather than lines count
    fn refresh_content_size(&mut self) {
        let host = &self.host;
        let size = if self.wraps.is_enabled() {
            let line_height = self.widths.line_height(|text| host.measure_text(text));
            TextSize::new(self.wraps.widest(), line_height * self.wraps.visual_rows() as f64)
        } else {
            self.widths
                .content_size(self.doc.lines().lines(), |text| host.measure_text(text))
        };
        if self.content_size != Some(size) {
            self.content_size = Some(size);
            self.notify(
                notifications::CONTENT_SIZE,
                json!({ "width": size.width, "height": size.height }),
            );
        }
    }
}

impl<H: HostCallbacks> Drop for Session<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

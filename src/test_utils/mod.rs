//! Test utilities
//! Shared testing helpers and mocks

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::host::{EventPayload, HostCallbacks};
use crate::lines::LineRange;
use crate::measure::TextSize;
use crate::timers::TimerToken;

/// Width of one character under [`RecordingHost::measure_text`]
pub const CHAR_WIDTH: f64 = 8.0;
/// Height of one line under [`RecordingHost::measure_text`]
pub const LINE_HEIGHT: f64 = 16.0;

/// One callback as the host saw it
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    RpcOut(Value),
    Invalidate(LineRange),
    Event(EventPayload, bool),
    Action(String),
    SetTimer(TimerToken, EventPayload, u32),
    CancelTimer(TimerToken),
}

/// Mock host for testing
/// Records every callback in order. Clones share the same log, so a test can
/// keep a handle after moving the host into a session.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Rc<RefCell<Vec<HostCall>>>,
    measured: Rc<RefCell<usize>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls, oldest first
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn rpc_messages(&self) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::RpcOut(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// Params of every outbound notification named `method`
    pub fn notifications(&self, method: &str) -> Vec<Value> {
        self.rpc_messages()
            .into_iter()
            .filter(|msg| msg["method"] == method)
            .map(|msg| msg["params"].clone())
            .collect()
    }

    /// Replies to requests (messages carrying an id)
    pub fn replies(&self) -> Vec<Value> {
        self.rpc_messages()
            .into_iter()
            .filter(|msg| msg.get("id").is_some())
            .collect()
    }

    pub fn invalidations(&self) -> Vec<LineRange> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Invalidate(range) => Some(*range),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<(EventPayload, bool)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Event(payload, handled) => Some((*payload, *handled)),
                _ => None,
            })
            .collect()
    }

    pub fn actions(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Action(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Tokens passed to `set_timer`
    pub fn timers_set(&self) -> Vec<TimerToken> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::SetTimer(token, _, _) => Some(*token),
                _ => None,
            })
            .collect()
    }

    pub fn timers_cancelled(&self) -> Vec<TimerToken> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::CancelTimer(token) => Some(*token),
                _ => None,
            })
            .collect()
    }

    /// Number of `measure_text` calls
    pub fn measure_count(&self) -> usize {
        *self.measured.borrow()
    }

    fn record(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl HostCallbacks for RecordingHost {
    fn rpc_out(&mut self, message: &str) {
        let value = serde_json::from_str(message).unwrap_or(Value::String(message.to_string()));
        self.record(HostCall::RpcOut(value));
    }

    fn invalidate(&mut self, range: LineRange) {
        self.record(HostCall::Invalidate(range));
    }

    /// Monospace: every character is [`CHAR_WIDTH`] wide
    fn measure_text(&self, text: &str) -> TextSize {
        *self.measured.borrow_mut() += 1;
        TextSize::new(text.chars().count() as f64 * CHAR_WIDTH, LINE_HEIGHT)
    }

    fn event(&mut self, payload: &EventPayload, handled: bool) {
        self.record(HostCall::Event(*payload, handled));
    }

    fn action(&mut self, name: &str) {
        self.record(HostCall::Action(name.to_string()));
    }

    fn set_timer(&mut self, token: TimerToken, payload: &EventPayload, delay_ms: u32) {
        self.record(HostCall::SetTimer(token, *payload, delay_ms));
    }

    fn cancel_timer(&mut self, token: TimerToken) {
        self.record(HostCall::CancelTimer(token));
    }
}

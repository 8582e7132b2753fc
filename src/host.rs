//! Callbacks the engine invokes into host-owned code
//!
//! A [`Session`](crate::session::Session) owns one value implementing
//! [`HostCallbacks`] for its whole lifetime. Every callback is synchronous and
//! runs inside the call that triggered it; implementations must not call back
//! into the session from within a callback.

use crate::lines::LineRange;
use crate::measure::TextSize;
use crate::timers::TimerToken;

/// Opaque correlation value for one input event.
///
/// The host chooses the value when it calls `handle_input`; the engine hands
/// it back unchanged in the `event` callback and in timer requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventPayload(pub u64);

pub trait HostCallbacks {
    /// One outbound protocol message (a JSON object)
    fn rpc_out(&mut self, message: &str);

    /// Lines the host must redraw; [`LineRange::ALL`] for the whole document
    fn invalidate(&mut self, range: LineRange);

    /// Measure `text` for layout. Must be deterministic.
    fn measure_text(&self, text: &str) -> TextSize;

    /// Emitted exactly once per `handle_input` and per live timer fire
    fn event(&mut self, payload: &EventPayload, handled: bool);

    /// A named action the engine does not interpret
    fn action(&mut self, name: &str);

    /// Call `Session::fire_timer(token, payload)` after `delay_ms`
    fn set_timer(&mut self, token: TimerToken, payload: &EventPayload, delay_ms: u32);

    /// The timer will not be needed; firing it anyway is harmless
    fn cancel_timer(&mut self, token: TimerToken);
}

impl<H: HostCallbacks + ?Sized> HostCallbacks for Box<H> {
    fn rpc_out(&mut self, message: &str) {
        (**self).rpc_out(message);
    }

    fn invalidate(&mut self, range: LineRange) {
        (**self).invalidate(range);
    }

    fn measure_text(&self, text: &str) -> TextSize {
        (**self).measure_text(text)
    }

    fn event(&mut self, payload: &EventPayload, handled: bool) {
        (**self).event(payload, handled);
    }

    fn action(&mut self, name: &str) {
        (**self).action(name);
    }

    fn set_timer(&mut self, token: TimerToken, payload: &EventPayload, delay_ms: u32) {
        (**self).set_timer(token, payload, delay_ms);
    }

    fn cancel_timer(&mut self, token: TimerToken) {
        (**self).cancel_timer(token);
    }
}

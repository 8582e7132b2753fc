use std::collections::HashMap;

use crate::host::EventPayload;

/// Identifies one scheduled wake-up. Zero is never issued.
pub type TimerToken = u32;

/// What a timer resolves when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Timeout of a pending multi-key sequence
    PendingSequence,
}

/// A live timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTimer {
    pub token: TimerToken,
    pub purpose: TimerPurpose,
    pub payload: EventPayload,
    pub delay_ms: u32,
}

/// Result of scheduling a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub token: TimerToken,
    /// Earlier live timer for the same purpose, now dead
    pub superseded: Option<TimerToken>,
}

/// Tracks live timer tokens.
///
/// The host does the actual waiting; this registry only decides whether a
/// token that comes back is still meaningful. Tokens are allocated
/// monotonically and never collide with a live token, even after wraparound.
#[derive(Debug)]
pub struct TimerRegistry {
    /// Live timers keyed by token
    live: HashMap<TimerToken, ScheduledTimer>,
    /// Next candidate token
    next_token: TimerToken,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Registry whose first allocated token is `token` (or 1 for zero)
    pub fn starting_at(token: TimerToken) -> Self {
        Self {
            live: HashMap::new(),
            next_token: token.max(1),
        }
    }

    fn allocate(&mut self) -> TimerToken {
        loop {
            let token = self.next_token;
            self.next_token = self.next_token.checked_add(1).unwrap_or(1);
            if !self.live.contains_key(&token) {
                return token;
            }
        }
    }

    /// Register a new timer. A live timer with the same purpose is superseded.
    pub fn schedule(&mut self, purpose: TimerPurpose, payload: EventPayload, delay_ms: u32) -> Scheduled {
        let superseded = self.cancel_purpose(purpose);
        let token = self.allocate();
        self.live.insert(
            token,
            ScheduledTimer {
                token,
                purpose,
                payload,
                delay_ms,
            },
        );
        tracing::trace!(token, ?purpose, delay_ms, "timer scheduled");
        Scheduled { token, superseded }
    }

    /// Mark a token dead. Returns false if it was not live.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        self.live.remove(&token).is_some()
    }

    /// Cancel the live timer for `purpose`, if any
    pub fn cancel_purpose(&mut self, purpose: TimerPurpose) -> Option<TimerToken> {
        let token = self.live_token(purpose)?;
        self.live.remove(&token);
        Some(token)
    }

    /// Consume a fired token. Dead or unknown tokens yield `None`.
    pub fn fire(&mut self, token: TimerToken) -> Option<ScheduledTimer> {
        let timer = self.live.remove(&token);
        if timer.is_none() {
            tracing::trace!(token, "stale timer ignored");
        }
        timer
    }

    pub fn live_token(&self, purpose: TimerPurpose) -> Option<TimerToken> {
        self.live
            .values()
            .find(|timer| timer.purpose == purpose)
            .map(|timer| timer.token)
    }

    pub fn is_live(&self, token: TimerToken) -> bool {
        self.live.contains_key(&token)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Remove every live timer, returning their tokens in ascending order
    pub fn drain(&mut self) -> Vec<TimerToken> {
        let mut tokens: Vec<TimerToken> = self.live.drain().map(|(token, _)| token).collect();
        tokens.sort_unstable();
        tokens
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

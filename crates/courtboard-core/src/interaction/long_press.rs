//! Long-press timer bookkeeping.
//!
//! The machine never sleeps or spawns. Entering the awaiting state issues a
//! fresh [`LongPressToken`] and a deadline; hosts either poll the machine
//! with the current time or schedule their own single-shot callback and hand
//! the token back. A token is only honoured while the exact awaiting state
//! that issued it is still current, so a late callback can never fire into a
//! later gesture.

use std::time::Duration;

use crate::input::Instant;

/// Identifies one pending long press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LongPressToken(u64);

/// A pending long press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongPress {
    pub token: LongPressToken,
    pub deadline: Instant,
}

impl LongPress {
    /// Whether the hold time has elapsed at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// Hands out unique tokens.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenSource {
    next: u64,
}

impl TokenSource {
    pub fn start(&mut self, now: Instant, hold: Duration) -> LongPress {
        let token = LongPressToken(self.next);
        self.next = self.next.wrapping_add(1);
        LongPress {
            token,
            deadline: now + hold,
        }
    }
}

//! Per-customer session state.

use super::phase::Phase;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Currency amount in whole units.
pub type Amount = u32;

/// Number of digits in a PIN.
pub const PIN_LENGTH: usize = 4;

/// Token identifying one customer session.
///
/// Scheduled callbacks capture the token of the session that requested
/// them; a callback carrying a superseded token is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable state of one withdrawal session.
///
/// A session is never partially reused: a reset builds a fresh one through
/// [`Session::succeed`], which only carries the balance over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    pub(crate) phase: Phase,
    pub(crate) balance: Amount,
    pub(crate) pin_attempts: u32,
    pub(crate) max_attempts: u32,
    pub(crate) entered_pin: Vec<u8>,
    pub(crate) amount_buffer: String,
    pub(crate) pending_amount: Option<Amount>,
}

impl Session {
    /// Open a session on an idle terminal.
    pub fn new(balance: Amount, max_attempts: u32) -> Self {
        Self {
            id: SessionId::new(),
            phase: Phase::Welcome,
            balance,
            pin_attempts: 0,
            max_attempts,
            entered_pin: Vec::with_capacity(PIN_LENGTH),
            amount_buffer: String::new(),
            pending_amount: None,
        }
    }

    /// Replacement session for the next customer. Only the balance survives.
    pub fn succeed(&self) -> Self {
        Self::new(self.balance, self.max_attempts)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn pin_attempts(&self) -> u32 {
        self.pin_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Attempts left before lockout.
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.pin_attempts)
    }

    /// Number of PIN digits typed so far. The digits themselves are not exposed.
    pub fn entered_pin_len(&self) -> usize {
        self.entered_pin.len()
    }

    pub fn amount_buffer(&self) -> &str {
        &self.amount_buffer
    }

    /// Value of the custom amount buffer, `0` when empty.
    pub fn buffered_amount(&self) -> Amount {
        self.amount_buffer.parse().unwrap_or(0)
    }

    /// Amount awaiting confirmation. Only meaningful while confirming or processing.
    pub fn pending_amount(&self) -> Option<Amount> {
        match self.phase {
            Phase::Confirming | Phase::Processing => self.pending_amount,
            _ => None,
        }
    }

    /// Append a PIN digit. Returns false once the PIN is full.
    pub(crate) fn push_pin_digit(&mut self, digit: u8) -> bool {
        if self.entered_pin.len() >= PIN_LENGTH {
            return false;
        }
        self.entered_pin.push(digit);
        true
    }

    /// Append an amount digit unless the buffer already holds `max_digits`.
    pub(crate) fn push_amount_digit(&mut self, digit: u8, max_digits: usize) -> bool {
        if self.amount_buffer.len() >= max_digits {
            return false;
        }
        self.amount_buffer.push(char::from(b'0' + digit));
        true
    }

    pub(crate) fn clear_pin(&mut self) {
        self.entered_pin.clear();
    }

    pub(crate) fn clear_amount(&mut self) {
        self.amount_buffer.clear();
    }

    /// True when the entered digits equal `expected` exactly.
    pub(crate) fn pin_matches(&self, expected: &[u8]) -> bool {
        self.entered_pin.as_slice() == expected
    }

    /// Record a failed PIN attempt and report whether the session is now locked.
    pub(crate) fn register_failed_attempt(&mut self) -> bool {
        self.pin_attempts = (self.pin_attempts + 1).min(self.max_attempts);
        self.pin_attempts >= self.max_attempts
    }

    pub(crate) fn reset_attempts(&mut self) {
        self.pin_attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_idle_and_empty() {
        let session = Session::new(5000, 3);
        assert_eq!(session.phase(), Phase::Welcome);
        assert_eq!(session.balance(), 5000);
        assert_eq!(session.pin_attempts(), 0);
        assert_eq!(session.entered_pin_len(), 0);
        assert!(session.amount_buffer().is_empty());
        assert_eq!(session.pending_amount(), None);
    }

    #[test]
    fn pin_never_exceeds_four_digits() {
        let mut session = Session::new(0, 3);
        for digit in [1, 2, 3, 4] {
            assert!(session.push_pin_digit(digit));
        }
        assert!(!session.push_pin_digit(5));
        assert_eq!(session.entered_pin_len(), PIN_LENGTH);
        assert!(session.pin_matches(&[1, 2, 3, 4]));
    }

    #[test]
    fn amount_buffer_is_bounded() {
        let mut session = Session::new(0, 3);
        assert!(session.push_amount_digit(1, 3));
        assert!(session.push_amount_digit(5, 3));
        assert!(session.push_amount_digit(0, 3));
        assert!(!session.push_amount_digit(0, 3));
        assert_eq!(session.amount_buffer(), "150");
        assert_eq!(session.buffered_amount(), 150);
    }

    #[test]
    fn failed_attempts_lock_exactly_at_max() {
        let mut session = Session::new(0, 3);
        assert!(!session.register_failed_attempt());
        assert!(!session.register_failed_attempt());
        assert_eq!(session.remaining_attempts(), 1);
        assert!(session.register_failed_attempt());
        assert_eq!(session.pin_attempts(), 3);
    }

    #[test]
    fn successor_keeps_only_balance() {
        let mut session = Session::new(4800, 3);
        session.push_pin_digit(9);
        session.push_amount_digit(2, 3);
        session.register_failed_attempt();
        session.pending_amount = Some(200);

        let next = session.succeed();
        assert_ne!(next.id(), session.id());
        assert_eq!(next.balance(), 4800);
        assert_eq!(next.pin_attempts(), 0);
        assert_eq!(next.entered_pin_len(), 0);
        assert!(next.amount_buffer().is_empty());
        assert_eq!(next.pending_amount, None);
    }

    #[test]
    fn pending_amount_hidden_outside_confirmation() {
        let mut session = Session::new(1000, 3);
        session.pending_amount = Some(200);
        assert_eq!(session.pending_amount(), None);
        session.phase = Phase::Confirming;
        assert_eq!(session.pending_amount(), Some(200));
    }
}

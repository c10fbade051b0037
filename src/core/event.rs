//! Inbound events: customer input and elapsed delays.

use super::session::Amount;
use serde::{Deserialize, Serialize};

/// A single input from the keypad or the amount buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    Digit(u8),
    Confirm,
    Clear,
    Cancel,
    QuickSelect(Amount),
    EnableCustomAmount,
}

/// Work the controller asked the scheduler to run later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerEvent {
    /// Leave the wrong-PIN screen and return to PIN entry.
    PinRetry,
    /// Leave the lockout screen and reset the terminal.
    LockoutReset,
    /// Finish dispensing.
    ProcessingComplete,
    /// Hide the dispense visual.
    HideDispense,
}

/// What caused a transition, as kept in the transition log.
///
/// Digit and amount payloads are deliberately dropped so the log never
/// holds PIN digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    Digit,
    Confirm,
    Clear,
    Cancel,
    QuickSelect,
    EnableCustomAmount,
    Timer(TimerEvent),
}

impl From<Input> for Trigger {
    fn from(input: Input) -> Self {
        match input {
            Input::Digit(_) => Self::Digit,
            Input::Confirm => Self::Confirm,
            Input::Clear => Self::Clear,
            Input::Cancel => Self::Cancel,
            Input::QuickSelect(_) => Self::QuickSelect,
            Input::EnableCustomAmount => Self::EnableCustomAmount,
        }
    }
}

impl From<TimerEvent> for Trigger {
    fn from(event: TimerEvent) -> Self {
        Self::Timer(event)
    }
}

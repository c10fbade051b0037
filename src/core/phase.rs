//! Controller phases.
//!
//! A `Phase` is the single source of truth for which inputs the controller
//! accepts. Phases are plain values: inspecting them has no side effects.

use serde::{Deserialize, Serialize};

/// How an error screen is left once the customer acknowledges it or its
/// delay elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recovery {
    /// Wrong PIN with attempts remaining: back to PIN entry.
    ///
    /// Acknowledging returns to PIN entry in the same session instead of
    /// resetting to `Welcome`. A reset would start a fresh session with zero
    /// attempts, so a customer could dodge the lockout by confirming after
    /// every wrong PIN.
    RetryPin,
    /// Attempts exhausted: the whole session is discarded.
    Restart,
    /// Amount or funds rejection: back to amount selection.
    SelectAmount,
}

/// Position of the controller in a withdrawal session.
///
/// # Example
///
/// ```rust
/// use cashpoint::core::{Phase, Recovery};
///
/// assert_eq!(Phase::Welcome.name(), "Welcome");
/// assert!(Phase::Success.is_final());
/// assert!(Phase::Error { recovery: Recovery::Restart }.is_error());
/// assert!(!Phase::Processing.is_final());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Idle terminal waiting for a customer.
    #[default]
    Welcome,
    /// Collecting PIN digits.
    EnteringPin,
    /// Authenticated, choosing a quick amount or custom entry.
    SelectingAmount,
    /// Typing a custom amount.
    EnteringCustomAmount,
    /// Waiting for the customer to accept or decline the pending amount.
    Confirming,
    /// Dispensing in progress; no input except cancel is accepted.
    Processing,
    /// Cash dispensed.
    Success,
    /// A business rule rejected the last action.
    Error { recovery: Recovery },
}

impl Phase {
    /// Name used in logs and transition records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::EnteringPin => "EnteringPin",
            Self::SelectingAmount => "SelectingAmount",
            Self::EnteringCustomAmount => "EnteringCustomAmount",
            Self::Confirming => "Confirming",
            Self::Processing => "Processing",
            Self::Success => "Success",
            Self::Error { .. } => "Error",
        }
    }

    /// Phases that only wait for an acknowledgement before the session moves on.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Success | Self::Error { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// True for the phases where the PIN has been verified.
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            Self::SelectingAmount
                | Self::EnteringCustomAmount
                | Self::Confirming
                | Self::Processing
                | Self::Success
                | Self::Error {
                    recovery: Recovery::SelectAmount
                }
        )
    }

    /// Error recovery, if this is an error phase.
    pub fn recovery(&self) -> Option<Recovery> {
        match self {
            Self::Error { recovery } => Some(*recovery),
            _ => None,
        }
    }
}

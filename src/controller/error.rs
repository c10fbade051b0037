//! Business-rule rejections.

use crate::core::{Amount, Recovery};
use crate::policy::AmountViolation;
use thiserror::Error;

/// Why the controller refused an action.
///
/// These are never faults: each one is shown on the error screen and the
/// controller moves to a well-defined error phase.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Incorrect PIN. Attempts remaining: {remaining}")]
    InvalidPin { remaining: u32 },

    #[error("Card blocked. Contact your bank.")]
    PinLockout,

    #[error("Enter a valid amount")]
    InvalidAmountFormat,

    #[error("The minimum amount is ${min}")]
    AmountBelowMinimum { min: Amount },

    #[error("The maximum amount is ${max}")]
    AmountAboveMaximum { max: Amount },

    #[error("The amount must be a multiple of ${step}")]
    AmountNotMultiple { step: Amount },

    #[error("Insufficient funds")]
    InsufficientFunds { requested: Amount, available: Amount },
}

impl TransactionError {
    /// How the error screen is left.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::InvalidPin { .. } => Recovery::RetryPin,
            Self::PinLockout => Recovery::Restart,
            Self::InvalidAmountFormat
            | Self::AmountBelowMinimum { .. }
            | Self::AmountAboveMaximum { .. }
            | Self::AmountNotMultiple { .. }
            | Self::InsufficientFunds { .. } => Recovery::SelectAmount,
        }
    }
}

impl From<AmountViolation> for TransactionError {
    fn from(violation: AmountViolation) -> Self {
        match violation {
            AmountViolation::Unparseable => Self::InvalidAmountFormat,
            AmountViolation::BelowMinimum { min } => Self::AmountBelowMinimum { min },
            AmountViolation::AboveMaximum { max } => Self::AmountAboveMaximum { max },
            AmountViolation::NotMultiple { step } => Self::AmountNotMultiple { step },
        }
    }
}

//! Amount rule violations.

use crate::core::Amount;
use thiserror::Error;

/// A withdrawal amount broke one of the policy's numeric rules.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AmountViolation {
    #[error("Enter a valid amount")]
    Unparseable,

    #[error("The minimum amount is ${min}")]
    BelowMinimum { min: Amount },

    #[error("The maximum amount is ${max}")]
    AboveMaximum { max: Amount },

    #[error("The amount must be a multiple of ${step}")]
    NotMultiple { step: Amount },
}

impl AmountViolation {
    /// Order in which violations are reported when several apply.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Unparseable => 0,
            Self::BelowMinimum { .. } => 1,
            Self::AboveMaximum { .. } => 2,
            Self::NotMultiple { .. } => 3,
        }
    }
}

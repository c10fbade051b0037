//! Build errors for controllers, policies and their configuration.

use crate::core::Amount;
use thiserror::Error;

/// Errors that can occur when building a controller or an amount policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Display not specified. Call .display(display) before .build()")]
    MissingDisplay,

    #[error("Scheduler not specified. Call .scheduler(scheduler) before .build()")]
    MissingScheduler,

    #[error("PIN must be exactly {expected} digits, got {length}")]
    PinLength { expected: usize, length: usize },

    #[error("PIN must contain only digits")]
    PinNotNumeric,

    #[error("At least one PIN attempt must be allowed")]
    ZeroAttempts,

    #[error("Amount step must be greater than zero")]
    ZeroStep,

    #[error("Minimum amount must be greater than zero")]
    ZeroMinimum,

    #[error("Minimum amount ({min}) exceeds maximum amount ({max})")]
    MinimumAboveMaximum { min: Amount, max: Amount },

    #[error("Dispense unit value must be greater than zero")]
    ZeroUnitValue,
}

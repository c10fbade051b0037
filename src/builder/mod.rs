//! Builder API for ergonomic controller construction.
//!
//! This module provides a fluent builder for controllers plus a shortcut for
//! the common in-memory setup used by tests and simulators.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::ControllerBuilder;

use crate::controller::Controller;
use crate::effects::{ManualScheduler, RecordingDisplay};
use crate::policy::AmountPolicy;

/// Create a stock terminal ($5000, PIN "1234") with an in-memory display
/// and a virtual clock.
///
/// # Example
///
/// ```
/// use cashpoint::builder::simulated;
/// use cashpoint::core::Phase;
/// use cashpoint::policy::AmountPolicy;
///
/// let mut terminal = simulated(AmountPolicy::quick_select());
/// terminal.on_confirm();
/// assert_eq!(terminal.phase(), Phase::EnteringPin);
/// ```
pub fn simulated(policy: AmountPolicy) -> Controller<RecordingDisplay, ManualScheduler> {
    ControllerBuilder::new()
        .policy(policy)
        .display(RecordingDisplay::new())
        .scheduler(ManualScheduler::new())
        .build()
        .expect("Stock terminal should always build")
}

//! The transaction controller.
//!
//! Drives one withdrawal session through its phases:
//!
//! ```text
//! Welcome -> EnteringPin -> SelectingAmount | EnteringCustomAmount
//!         -> Confirming -> Processing -> Success | Error -> Welcome
//! ```
//!
//! Inputs that do not apply to the current phase are ignored. Business-rule
//! failures move the controller to an error phase and are reported as
//! [`StepResult::Rejected`]; nothing here returns `Err` for them.

mod error;
mod machine;

pub use error::TransactionError;
pub use machine::{Controller, StepResult};

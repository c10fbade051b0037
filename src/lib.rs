//! Cashpoint: transaction control for a cash-dispensing terminal
//!
//! Cashpoint follows a "pure core, imperative shell" layout. Session state,
//! phases and amount rules are plain values; rendering and delays are
//! collaborators the controller calls out to through traits.
//!
//! # Core Concepts
//!
//! - **Controller**: finite-state machine owning one customer session
//! - **Policy**: pluggable withdrawal amount rules
//! - **Effects**: `Display` sink and `Scheduler` for delayed callbacks
//!
//! # Example
//!
//! ```rust
//! use cashpoint::builder::simulated;
//! use cashpoint::core::Phase;
//! use cashpoint::policy::AmountPolicy;
//!
//! let mut terminal = simulated(AmountPolicy::quick_select());
//! terminal.on_confirm();
//! for digit in [1, 2, 3, 4] {
//!     terminal.on_digit(digit);
//! }
//! terminal.on_confirm();
//! terminal.on_quick_select_amount(200);
//! terminal.on_confirm();
//! terminal.advance(2);
//!
//! assert_eq!(terminal.phase(), Phase::Success);
//! assert_eq!(terminal.balance(), 4800);
//! ```

pub mod builder;
pub mod config;
pub mod controller;
pub mod core;
pub mod effects;
pub mod policy;

// Re-export commonly used types
pub use builder::{BuildError, ControllerBuilder};
pub use config::TerminalConfig;
pub use controller::{Controller, StepResult, TransactionError};
pub use crate::core::{Input, Phase, Session};
pub use effects::{Display, ManualScheduler, RecordingDisplay, Scheduler, Screen};
pub use policy::AmountPolicy;

//! Withdrawal amount policies.
//!
//! Two rule sets exist in the field: custom entry of small bills
//! ($20–$500, step $10) and quick-select terminals ($100–$2000, step $100).
//! Both are values of [`AmountPolicy`], picked when the controller is built.
//!
//! Checks use Stillwater's `Validation` so every broken rule is collected in
//! one pass rather than failing at the first.
//!
//! # Example
//!
//! ```rust
//! use cashpoint::policy::AmountPolicyBuilder;
//!
//! let policy = AmountPolicyBuilder::new()
//!     .min(50)
//!     .max(1000)
//!     .step(50)
//!     .build()
//!     .unwrap();
//!
//! assert!(policy.validate(250).is_ok());
//! assert!(policy.validate(260).is_err());
//! ```

pub mod builder;
pub mod rules;
pub mod violations;

pub use builder::AmountPolicyBuilder;
pub use rules::AmountPolicy;
pub use violations::AmountViolation;

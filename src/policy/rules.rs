//! Amount rules checked with `Validation`.

use crate::core::Amount;
use crate::policy::violations::AmountViolation;
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Numeric rules a withdrawal amount must satisfy, chosen when the
/// controller is built.
///
/// Checks accumulate every violation instead of stopping at the first, so a
/// shell can show the customer all of them at once.
///
/// # Example
///
/// ```rust
/// use cashpoint::policy::{AmountPolicy, AmountViolation};
///
/// let policy = AmountPolicy::small_bills();
/// assert_eq!(policy.validate(120), Ok(120));
/// assert_eq!(
///     policy.validate(15),
///     Err(vec![
///         AmountViolation::BelowMinimum { min: 20 },
///         AmountViolation::NotMultiple { step: 10 },
///     ])
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountPolicy {
    pub(crate) min: Amount,
    pub(crate) max: Amount,
    pub(crate) step: Amount,
    pub(crate) allow_quick_select: bool,
}

impl AmountPolicy {
    /// Custom entry only: $20 to $500 in multiples of $10.
    pub fn small_bills() -> Self {
        Self {
            min: 20,
            max: 500,
            step: 10,
            allow_quick_select: false,
        }
    }

    /// Quick-select buttons plus custom entry: $100 to $2000 in multiples of $100.
    pub fn quick_select() -> Self {
        Self {
            min: 100,
            max: 2000,
            step: 100,
            allow_quick_select: true,
        }
    }

    pub fn min(&self) -> Amount {
        self.min
    }

    pub fn max(&self) -> Amount {
        self.max
    }

    pub fn step(&self) -> Amount {
        self.step
    }

    pub fn allows_quick_select(&self) -> bool {
        self.allow_quick_select
    }

    /// Longest custom amount the keypad accepts, in digits.
    pub fn max_digits(&self) -> usize {
        self.max.checked_ilog10().map_or(1, |d| d as usize + 1)
    }

    /// Check every rule, accumulating ALL violations.
    ///
    /// Zero stands for an empty or unparseable entry and is reported alone.
    pub fn check(&self, amount: Amount) -> Validation<Amount, NonEmptyVec<AmountViolation>> {
        if amount == 0 {
            return Validation::fail(AmountViolation::Unparseable);
        }

        let mut checks: Vec<Validation<(), NonEmptyVec<AmountViolation>>> = Vec::new();

        checks.push(if amount < self.min {
            Validation::fail(AmountViolation::BelowMinimum { min: self.min })
        } else {
            Validation::success(())
        });

        checks.push(if amount > self.max {
            Validation::fail(AmountViolation::AboveMaximum { max: self.max })
        } else {
            Validation::success(())
        });

        checks.push(if amount % self.step != 0 {
            Validation::fail(AmountViolation::NotMultiple { step: self.step })
        } else {
            Validation::success(())
        });

        Validation::all_vec(checks).map(|_| amount)
    }

    /// [`check`](Self::check) as a `Result`, violations sorted by precedence.
    pub fn validate(&self, amount: Amount) -> Result<Amount, Vec<AmountViolation>> {
        match self.check(amount) {
            Validation::Success(amount) => Ok(amount),
            Validation::Failure(errors) => {
                let mut violations: Vec<AmountViolation> = errors.iter().copied().collect();
                violations.sort_by_key(AmountViolation::precedence);
                Err(violations)
            }
        }
    }
}

impl Default for AmountPolicy {
    fn default() -> Self {
        Self::quick_select()
    }
}

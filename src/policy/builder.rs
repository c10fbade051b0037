//! Builder API for custom amount policies.

use crate::builder::BuildError;
use crate::core::Amount;
use crate::policy::rules::AmountPolicy;

/// Builder for amount policies that are neither preset.
///
/// Starts from the small-bills limits; every field can be overridden.
pub struct AmountPolicyBuilder {
    min: Amount,
    max: Amount,
    step: Amount,
    allow_quick_select: bool,
}

impl AmountPolicyBuilder {
    pub fn new() -> Self {
        let base = AmountPolicy::small_bills();
        Self {
            min: base.min,
            max: base.max,
            step: base.step,
            allow_quick_select: base.allow_quick_select,
        }
    }

    /// Start from an existing policy.
    pub fn from_policy(policy: AmountPolicy) -> Self {
        Self {
            min: policy.min,
            max: policy.max,
            step: policy.step,
            allow_quick_select: policy.allow_quick_select,
        }
    }

    /// Set the smallest amount accepted
    pub fn min(mut self, min: Amount) -> Self {
        self.min = min;
        self
    }

    /// Set the largest amount accepted
    pub fn max(mut self, max: Amount) -> Self {
        self.max = max;
        self
    }

    /// Set the multiple every amount must be
    pub fn step(mut self, step: Amount) -> Self {
        self.step = step;
        self
    }

    /// Enable or disable the quick-select buttons
    pub fn quick_select(mut self, allow: bool) -> Self {
        self.allow_quick_select = allow;
        self
    }

    /// Build the policy, rejecting limits no amount could satisfy.
    pub fn build(self) -> Result<AmountPolicy, BuildError> {
        if self.step == 0 {
            return Err(BuildError::ZeroStep);
        }
        if self.min == 0 {
            return Err(BuildError::ZeroMinimum);
        }
        if self.min > self.max {
            return Err(BuildError::MinimumAboveMaximum {
                min: self.min,
                max: self.max,
            });
        }

        Ok(AmountPolicy {
            min: self.min,
            max: self.max,
            step: self.step,
            allow_quick_select: self.allow_quick_select,
        })
    }
}

impl Default for AmountPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Builder for constructing controllers.

use crate::builder::error::BuildError;
use crate::config::{Delays, TerminalConfig};
use crate::controller::Controller;
use crate::core::Amount;
use crate::effects::{Display, Scheduler};
use crate::policy::AmountPolicy;

/// Builder for constructing controllers with a fluent API.
///
/// Starts from [`TerminalConfig::default`]; individual settings override it.
pub struct ControllerBuilder<D: Display, S: Scheduler> {
    config: TerminalConfig,
    display: Option<D>,
    scheduler: Option<S>,
}

impl<D: Display, S: Scheduler> ControllerBuilder<D, S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: TerminalConfig::default(),
            display: None,
            scheduler: None,
        }
    }

    /// Replace every setting with `config`.
    pub fn config(mut self, config: TerminalConfig) -> Self {
        self.config = config;
        self
    }

    /// Funds loaded at start-up.
    pub fn opening_balance(mut self, balance: Amount) -> Self {
        self.config.opening_balance = balance;
        self
    }

    /// The PIN customers must enter. Validated on build.
    pub fn pin(mut self, pin: impl Into<String>) -> Self {
        self.config.pin.correct_pin = pin.into();
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.pin.max_attempts = attempts;
        self
    }

    pub fn policy(mut self, policy: AmountPolicy) -> Self {
        self.config.policy = policy.into();
        self
    }

    pub fn delays(mut self, delays: Delays) -> Self {
        self.config.delays = delays;
        self
    }

    /// Set the display sink (required).
    pub fn display(mut self, display: D) -> Self {
        self.display = Some(display);
        self
    }

    /// Set the scheduler (required).
    pub fn scheduler(mut self, scheduler: S) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Build the controller.
    /// Returns an error if a collaborator is missing or a setting is invalid.
    pub fn build(self) -> Result<Controller<D, S>, BuildError> {
        let display = self.display.ok_or(BuildError::MissingDisplay)?;
        let scheduler = self.scheduler.ok_or(BuildError::MissingScheduler)?;
        Controller::new(&self.config, display, scheduler)
    }
}

impl<D: Display, S: Scheduler> Default for ControllerBuilder<D, S> {
    fn default() -> Self {
        Self::new()
    }
}

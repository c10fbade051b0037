//! Transaction controller that drives one withdrawal session at a time.

use crate::builder::BuildError;
use crate::config::{Delays, DispenseConfig, TerminalConfig};
use crate::controller::error::TransactionError;
use crate::core::{
    Amount, Input, Phase, Recovery, Session, TimerEvent, TransitionLog, TransitionRecord, Trigger,
};
use crate::effects::{Deferred, Display, ManualScheduler, Scheduler, Screen, Ticks, TimerHandle};
use crate::policy::AmountPolicy;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Result of handling one input or one elapsed delay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// Moved to a new phase
    Transitioned(Phase),

    /// Stayed in the same phase; buffers or display changed
    Updated,

    /// A business rule refused the action; the error screen is up
    Rejected(TransactionError),

    /// Input not accepted in the current phase, or a stale callback
    Ignored,
}

impl StepResult {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    /// The rejection, if any.
    pub fn rejection(&self) -> Option<TransactionError> {
        match self {
            Self::Rejected(error) => Some(*error),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Settings {
    pin: Vec<u8>,
    policy: AmountPolicy,
    delays: Delays,
    dispense: DispenseConfig,
}

/// Finite-state controller for a cash-dispensing terminal.
///
/// Owns the current [`Session`] and renders through `D`. Delays are
/// requested from `S`; when one comes due the driver hands the
/// [`Deferred`] back to [`Controller::fire`]. Every callback carries the
/// token of the session that asked for it and is ignored once that session
/// has been replaced; pending callbacks are also cancelled on reset.
pub struct Controller<D: Display, S: Scheduler> {
    settings: Settings,
    session: Session,
    display: D,
    scheduler: S,
    timers: Vec<(TimerHandle, TimerEvent)>,
    dispensing: bool,
    history: TransitionLog,
}

impl<D: Display, S: Scheduler> Controller<D, S> {
    /// Create a controller on the welcome screen.
    pub fn new(config: &TerminalConfig, display: D, scheduler: S) -> Result<Self, BuildError> {
        config.validate()?;
        let settings = Settings {
            pin: config.pin.digits()?,
            policy: config.policy.to_policy()?,
            delays: config.delays,
            dispense: config.dispense,
        };

        let mut controller = Self {
            settings,
            session: Session::new(config.opening_balance, config.pin.max_attempts),
            display,
            scheduler,
            timers: Vec::new(),
            dispensing: false,
            history: TransitionLog::with_capacity(config.history_capacity),
        };
        controller.display.show_screen(Screen::Welcome);
        info!(
            session = %controller.session.id(),
            balance = controller.session.balance(),
            "terminal ready"
        );
        Ok(controller)
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn balance(&self) -> Amount {
        self.session.balance()
    }

    pub fn policy(&self) -> &AmountPolicy {
        &self.settings.policy
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn history(&self) -> &TransitionLog {
        &self.history
    }

    /// Dispatch an input to the matching handler.
    pub fn handle(&mut self, input: Input) -> StepResult {
        match input {
            Input::Digit(digit) => self.on_digit(digit),
            Input::Confirm => self.on_confirm(),
            Input::Clear => self.on_clear(),
            Input::Cancel => self.on_cancel(),
            Input::QuickSelect(amount) => self.on_quick_select_amount(amount),
            Input::EnableCustomAmount => self.on_enable_custom_amount(),
        }
    }

    /// Keypad digit 0-9.
    pub fn on_digit(&mut self, digit: u8) -> StepResult {
        if digit > 9 {
            return self.ignore(Trigger::Digit, "not a keypad digit");
        }

        match self.session.phase {
            Phase::EnteringPin => {
                if !self.session.push_pin_digit(digit) {
                    return self.ignore(Trigger::Digit, "PIN already complete");
                }
                self.display.set_masked_pin(self.session.entered_pin_len());
                StepResult::Updated
            }
            Phase::EnteringCustomAmount => {
                let max_digits = self.settings.policy.max_digits();
                if !self.session.push_amount_digit(digit, max_digits) {
                    return self.ignore(Trigger::Digit, "amount buffer full");
                }
                self.display.set_amount_text(self.session.buffered_amount());
                StepResult::Updated
            }
            Phase::Confirming => match digit {
                1 => self.begin_processing(Trigger::Digit),
                2 => self.show_amount_selection(Trigger::Digit),
                _ => self.ignore(Trigger::Digit, "confirmation expects 1 or 2"),
            },
            _ => self.ignore(Trigger::Digit, "digits not accepted"),
        }
    }

    pub fn on_confirm(&mut self) -> StepResult {
        match self.session.phase {
            Phase::Welcome => self.start_session(),
            Phase::EnteringPin => self.validate_pin(),
            Phase::EnteringCustomAmount => {
                let amount = self.session.buffered_amount();
                self.select_amount(amount, Trigger::Confirm)
            }
            Phase::Confirming => self.begin_processing(Trigger::Confirm),
            Phase::Success => self.reset(Trigger::Confirm),
            Phase::Error { recovery } => self.recover(recovery, Trigger::Confirm),
            Phase::SelectingAmount | Phase::Processing => {
                self.ignore(Trigger::Confirm, "nothing to confirm")
            }
        }
    }

    /// Empty the buffer being typed into.
    pub fn on_clear(&mut self) -> StepResult {
        match self.session.phase {
            Phase::EnteringPin => {
                self.session.clear_pin();
                self.display.set_masked_pin(0);
                StepResult::Updated
            }
            Phase::EnteringCustomAmount => {
                self.session.clear_amount();
                self.display.set_amount_text(0);
                StepResult::Updated
            }
            _ => self.ignore(Trigger::Clear, "nothing to clear"),
        }
    }

    /// Abandon the session from any phase but `Welcome`.
    pub fn on_cancel(&mut self) -> StepResult {
        if self.session.phase == Phase::Welcome {
            return self.ignore(Trigger::Cancel, "no session to cancel");
        }
        info!(session = %self.session.id(), phase = self.session.phase.name(), "session cancelled");
        self.reset(Trigger::Cancel)
    }

    pub fn on_quick_select_amount(&mut self, amount: Amount) -> StepResult {
        if self.session.phase != Phase::SelectingAmount {
            return self.ignore(Trigger::QuickSelect, "not selecting an amount");
        }
        if !self.settings.policy.allows_quick_select() {
            return self.ignore(Trigger::QuickSelect, "quick-select disabled by policy");
        }
        self.select_amount(amount, Trigger::QuickSelect)
    }

    pub fn on_enable_custom_amount(&mut self) -> StepResult {
        if self.session.phase != Phase::SelectingAmount {
            return self.ignore(Trigger::EnableCustomAmount, "not selecting an amount");
        }
        self.session.clear_amount();
        self.display.set_amount_text(0);
        self.display.show_screen(Screen::CustomAmount);
        self.transition(Phase::EnteringCustomAmount, Trigger::EnableCustomAmount)
    }

    /// Run a callback that came due.
    pub fn fire(&mut self, deferred: Deferred) -> StepResult {
        if deferred.session != self.session.id() {
            debug!(
                stale = %deferred.session,
                current = %self.session.id(),
                event = ?deferred.event,
                "ignoring callback from superseded session"
            );
            return StepResult::Ignored;
        }
        self.forget_timer(deferred.event);

        let trigger = Trigger::Timer(deferred.event);
        match (deferred.event, self.session.phase) {
            (
                TimerEvent::PinRetry,
                Phase::Error {
                    recovery: Recovery::RetryPin,
                },
            ) => self.return_to_pin(trigger),
            (
                TimerEvent::LockoutReset,
                Phase::Error {
                    recovery: Recovery::Restart,
                },
            ) => self.reset(trigger),
            (TimerEvent::ProcessingComplete, Phase::Processing) => self.complete_processing(),
            (TimerEvent::HideDispense, _) => {
                self.hide_dispense();
                StepResult::Updated
            }
            _ => self.ignore(trigger, "callback no longer applies"),
        }
    }

    fn start_session(&mut self) -> StepResult {
        self.session.clear_pin();
        self.display.set_masked_pin(0);
        self.display.show_screen(Screen::Pin);
        info!(session = %self.session.id(), "session started");
        self.transition(Phase::EnteringPin, Trigger::Confirm)
    }

    fn validate_pin(&mut self) -> StepResult {
        if self.session.pin_matches(&self.settings.pin) {
            self.session.reset_attempts();
            self.session.clear_pin();
            info!(session = %self.session.id(), "PIN accepted");
            return self.show_amount_selection(Trigger::Confirm);
        }

        let locked = self.session.register_failed_attempt();
        self.session.clear_pin();

        if locked {
            warn!(
                session = %self.session.id(),
                attempts = self.session.pin_attempts(),
                "PIN attempts exhausted, card blocked"
            );
            self.schedule(self.settings.delays.lockout, TimerEvent::LockoutReset);
            self.reject(TransactionError::PinLockout, Trigger::Confirm)
        } else {
            let remaining = self.session.remaining_attempts();
            self.schedule(self.settings.delays.pin_retry, TimerEvent::PinRetry);
            self.reject(TransactionError::InvalidPin { remaining }, Trigger::Confirm)
        }
    }

    fn return_to_pin(&mut self, trigger: Trigger) -> StepResult {
        self.cancel_timer(TimerEvent::PinRetry);
        self.session.clear_pin();
        self.display.set_masked_pin(0);
        self.display.show_screen(Screen::Pin);
        self.transition(Phase::EnteringPin, trigger)
    }

    fn show_amount_selection(&mut self, trigger: Trigger) -> StepResult {
        self.session.clear_amount();
        self.session.pending_amount = None;
        self.display.set_balance_text(self.session.balance());
        self.display.show_screen(Screen::Withdrawal);
        self.transition(Phase::SelectingAmount, trigger)
    }

    /// Validate `amount` against the policy, then the balance.
    fn select_amount(&mut self, amount: Amount, trigger: Trigger) -> StepResult {
        if let Err(violations) = self.settings.policy.validate(amount) {
            let error = violations
                .first()
                .copied()
                .map(TransactionError::from)
                .unwrap_or(TransactionError::InvalidAmountFormat);
            let message = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return self.reject_with_message(error, &message, trigger);
        }

        let balance = self.session.balance();
        if amount > balance {
            return self.reject(
                TransactionError::InsufficientFunds {
                    requested: amount,
                    available: balance,
                },
                trigger,
            );
        }

        self.session.pending_amount = Some(amount);
        self.display
            .set_confirmation_details(amount, balance - amount);
        self.display.show_screen(Screen::Confirmation);
        self.transition(Phase::Confirming, trigger)
    }

    fn begin_processing(&mut self, trigger: Trigger) -> StepResult {
        let Some(amount) = self.session.pending_amount else {
            return self.ignore(trigger, "no amount pending");
        };

        let balance = self.session.balance();
        if amount > balance {
            return self.reject(
                TransactionError::InsufficientFunds {
                    requested: amount,
                    available: balance,
                },
                trigger,
            );
        }

        self.display.show_screen(Screen::Processing);
        let result = self.transition(Phase::Processing, trigger);
        self.schedule(
            self.settings.delays.processing,
            TimerEvent::ProcessingComplete,
        );
        result
    }

    fn complete_processing(&mut self) -> StepResult {
        let trigger = Trigger::Timer(TimerEvent::ProcessingComplete);
        let Some(amount) = self.session.pending_amount.take() else {
            warn!(session = %self.session.id(), "processing finished without a pending amount");
            return self.reset(trigger);
        };

        let available = self.session.balance();
        let Some(remaining) = available.checked_sub(amount) else {
            return self.reject(
                TransactionError::InsufficientFunds {
                    requested: amount,
                    available,
                },
                trigger,
            );
        };

        self.session.balance = remaining;
        info!(
            session = %self.session.id(),
            amount,
            balance = remaining,
            "cash dispensed"
        );

        self.display
            .show_dispense_animation(self.settings.dispense.units_for(amount));
        self.dispensing = true;
        self.schedule(
            self.settings.delays.dispense_visual,
            TimerEvent::HideDispense,
        );

        self.display.set_success_details(amount, remaining);
        self.display.show_screen(Screen::Success);
        self.transition(Phase::Success, trigger)
    }

    fn recover(&mut self, recovery: Recovery, trigger: Trigger) -> StepResult {
        match recovery {
            Recovery::RetryPin => self.return_to_pin(trigger),
            Recovery::Restart => self.reset(trigger),
            Recovery::SelectAmount => self.show_amount_selection(trigger),
        }
    }

    /// Replace the session wholesale and return to the welcome screen.
    fn reset(&mut self, trigger: Trigger) -> StepResult {
        self.cancel_all_timers();
        self.hide_dispense();

        let result = self.transition(Phase::Welcome, trigger);
        let previous = self.session.id();
        self.session = self.session.succeed();
        self.display.show_screen(Screen::Welcome);
        info!(
            previous = %previous,
            session = %self.session.id(),
            balance = self.session.balance(),
            "session reset"
        );
        result
    }

    fn reject(&mut self, error: TransactionError, trigger: Trigger) -> StepResult {
        let message = error.to_string();
        self.reject_with_message(error, &message, trigger)
    }

    fn reject_with_message(
        &mut self,
        error: TransactionError,
        message: &str,
        trigger: Trigger,
    ) -> StepResult {
        warn!(session = %self.session.id(), error = ?error, "{}", message);
        self.display.set_error_text(message);
        self.display.show_screen(Screen::Error);
        self.transition(
            Phase::Error {
                recovery: error.recovery(),
            },
            trigger,
        );
        StepResult::Rejected(error)
    }

    fn hide_dispense(&mut self) {
        if self.dispensing {
            self.display.hide_dispense_animation();
            self.dispensing = false;
        }
    }

    fn transition(&mut self, to: Phase, trigger: Trigger) -> StepResult {
        let from = self.session.phase;
        self.history.record(TransitionRecord {
            session: self.session.id(),
            from,
            to,
            trigger,
            timestamp: Utc::now(),
        });
        info!(
            session = %self.session.id(),
            from = from.name(),
            to = to.name(),
            trigger = ?trigger,
            "phase transition"
        );
        self.session.phase = to;
        StepResult::Transitioned(to)
    }

    fn ignore(&self, trigger: Trigger, reason: &str) -> StepResult {
        debug!(
            session = %self.session.id(),
            phase = self.session.phase.name(),
            trigger = ?trigger,
            reason,
            "input ignored"
        );
        StepResult::Ignored
    }

    fn schedule(&mut self, ticks: Ticks, event: TimerEvent) {
        let deferred = Deferred {
            session: self.session.id(),
            event,
        };
        let handle = self.scheduler.after(ticks, deferred);
        self.timers.push((handle, event));
    }

    fn forget_timer(&mut self, event: TimerEvent) {
        if let Some(index) = self.timers.iter().position(|(_, e)| *e == event) {
            self.timers.remove(index);
        }
    }

    fn cancel_timer(&mut self, event: TimerEvent) {
        if let Some(index) = self.timers.iter().position(|(_, e)| *e == event) {
            let (handle, _) = self.timers.remove(index);
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_all_timers(&mut self) {
        for (handle, event) in self.timers.drain(..) {
            if self.scheduler.cancel(handle) {
                debug!(?event, "cancelled pending callback");
            }
        }
    }
}

impl<D: Display> Controller<D, ManualScheduler> {
    /// Advance the virtual clock tick by tick, firing every callback as it
    /// comes due.
    pub fn advance(&mut self, ticks: Ticks) -> Vec<StepResult> {
        let mut results = Vec::new();
        for _ in 0..ticks {
            for deferred in self.scheduler.advance(1) {
                results.push(self.fire(deferred));
            }
        }
        results
    }

    /// Advance until no callback is pending, or `limit` ticks have passed.
    pub fn run_until_idle(&mut self, limit: Ticks) -> Vec<StepResult> {
        let mut results = Vec::new();
        let mut elapsed = 0;
        while !self.scheduler.is_idle() && elapsed < limit {
            results.extend(self.advance(1));
            elapsed += 1;
        }
        results
    }
}

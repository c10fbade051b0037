//! Display sink the controller renders through.

use crate::core::Amount;
use serde::{Deserialize, Serialize};

/// The screens a terminal can show. Exactly one is visible at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    Welcome,
    Pin,
    Withdrawal,
    CustomAmount,
    Confirmation,
    Processing,
    Success,
    Error,
}

/// Write-only presentation surface.
///
/// Implementations render; they never feed anything back to the controller.
pub trait Display {
    /// Make `screen` the visible screen.
    fn show_screen(&mut self, screen: Screen);

    /// Show `length` mask characters for the PIN typed so far.
    fn set_masked_pin(&mut self, length: usize);

    fn set_amount_text(&mut self, amount: Amount);

    fn set_balance_text(&mut self, amount: Amount);

    fn set_error_text(&mut self, message: &str);

    fn set_confirmation_details(&mut self, amount: Amount, remaining_balance: Amount);

    fn set_success_details(&mut self, amount: Amount, final_balance: Amount);

    /// Start the dispense visual with `unit_count` notes. Presentation only.
    fn show_dispense_animation(&mut self, unit_count: u32);

    fn hide_dispense_animation(&mut self);
}

/// One call received by a [`RecordingDisplay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayCall {
    ShowScreen(Screen),
    MaskedPin(usize),
    AmountText(Amount),
    BalanceText(Amount),
    ErrorText(String),
    ConfirmationDetails { amount: Amount, remaining: Amount },
    SuccessDetails { amount: Amount, balance: Amount },
    ShowDispense(u32),
    HideDispense,
}

/// Display that remembers what it was asked to show.
///
/// Used by tests and by shells that render from a snapshot instead of
/// reacting to each call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingDisplay {
    calls: Vec<DisplayCall>,
    screen: Option<Screen>,
    masked_pin: usize,
    amount_text: Option<Amount>,
    balance_text: Option<Amount>,
    error_text: Option<String>,
    dispensing: Option<u32>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call in the order received.
    pub fn calls(&self) -> &[DisplayCall] {
        &self.calls
    }

    /// Screens shown, in order.
    pub fn screens(&self) -> Vec<Screen> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DisplayCall::ShowScreen(screen) => Some(*screen),
                _ => None,
            })
            .collect()
    }

    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    pub fn masked_pin(&self) -> usize {
        self.masked_pin
    }

    pub fn amount_text(&self) -> Option<Amount> {
        self.amount_text
    }

    pub fn balance_text(&self) -> Option<Amount> {
        self.balance_text
    }

    pub fn error_text(&self) -> Option<&str> {
        self.error_text.as_deref()
    }

    /// Note count of the visible dispense visual, if any.
    pub fn dispensing(&self) -> Option<u32> {
        self.dispensing
    }
}

impl Display for RecordingDisplay {
    fn show_screen(&mut self, screen: Screen) {
        self.screen = Some(screen);
        self.calls.push(DisplayCall::ShowScreen(screen));
    }

    fn set_masked_pin(&mut self, length: usize) {
        self.masked_pin = length;
        self.calls.push(DisplayCall::MaskedPin(length));
    }

    fn set_amount_text(&mut self, amount: Amount) {
        self.amount_text = Some(amount);
        self.calls.push(DisplayCall::AmountText(amount));
    }

    fn set_balance_text(&mut self, amount: Amount) {
        self.balance_text = Some(amount);
        self.calls.push(DisplayCall::BalanceText(amount));
    }

    fn set_error_text(&mut self, message: &str) {
        self.error_text = Some(message.to_string());
        self.calls.push(DisplayCall::ErrorText(message.to_string()));
    }

    fn set_confirmation_details(&mut self, amount: Amount, remaining_balance: Amount) {
        self.calls.push(DisplayCall::ConfirmationDetails {
            amount,
            remaining: remaining_balance,
        });
    }

    fn set_success_details(&mut self, amount: Amount, final_balance: Amount) {
        self.calls.push(DisplayCall::SuccessDetails {
            amount,
            balance: final_balance,
        });
    }

    fn show_dispense_animation(&mut self, unit_count: u32) {
        self.dispensing = Some(unit_count);
        self.calls.push(DisplayCall::ShowDispense(unit_count));
    }

    fn hide_dispense_animation(&mut self) {
        self.dispensing = None;
        self.calls.push(DisplayCall::HideDispense);
    }
}

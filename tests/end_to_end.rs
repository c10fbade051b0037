//! Whole-session scenarios driven through the public API.

use cashpoint::builder::simulated;
use cashpoint::core::{Amount, Phase, Recovery};
use cashpoint::effects::{DisplayCall, Screen};
use cashpoint::policy::AmountPolicy;
use cashpoint::{
    Controller, ControllerBuilder, ManualScheduler, RecordingDisplay, StepResult,
    TerminalConfig, TransactionError,
};
use rstest::rstest;

type Terminal = Controller<RecordingDisplay, ManualScheduler>;

fn type_digits(terminal: &mut Terminal, digits: &str) {
    for c in digits.chars() {
        let digit = c.to_digit(10).expect("test input is numeric") as u8;
        terminal.on_digit(digit);
    }
}

/// Start a session and authenticate with the stock PIN.
fn signed_in(policy: AmountPolicy) -> Terminal {
    let mut terminal = simulated(policy);
    terminal.on_confirm();
    type_digits(&mut terminal, "1234");
    assert_eq!(
        terminal.on_confirm(),
        StepResult::Transitioned(Phase::SelectingAmount)
    );
    terminal
}

fn custom_amount(terminal: &mut Terminal, digits: &str) -> StepResult {
    terminal.on_enable_custom_amount();
    type_digits(terminal, digits);
    terminal.on_confirm()
}

#[test]
fn withdraw_200_then_start_over() {
    let mut terminal = simulated(AmountPolicy::quick_select());

    assert_eq!(
        terminal.on_confirm(),
        StepResult::Transitioned(Phase::EnteringPin)
    );
    type_digits(&mut terminal, "1234");
    assert_eq!(
        terminal.on_confirm(),
        StepResult::Transitioned(Phase::SelectingAmount)
    );
    assert_eq!(
        terminal.on_quick_select_amount(200),
        StepResult::Transitioned(Phase::Confirming)
    );
    assert_eq!(
        terminal.on_confirm(),
        StepResult::Transitioned(Phase::Processing)
    );
    assert_eq!(terminal.balance(), 5000);

    assert_eq!(
        terminal.advance(2),
        vec![StepResult::Transitioned(Phase::Success)]
    );
    assert_eq!(terminal.balance(), 4800);
    assert!(terminal
        .display()
        .calls()
        .contains(&DisplayCall::SuccessDetails {
            amount: 200,
            balance: 4800,
        }));
    assert_eq!(terminal.display().dispensing(), Some(15));

    assert_eq!(
        terminal.on_confirm(),
        StepResult::Transitioned(Phase::Welcome)
    );
    assert_eq!(terminal.balance(), 4800);
    assert_eq!(terminal.session().pin_attempts(), 0);
    assert_eq!(terminal.display().screen(), Some(Screen::Welcome));
}

#[test]
fn second_withdrawal_uses_the_carried_balance() {
    let mut terminal = signed_in(AmountPolicy::quick_select());
    terminal.on_quick_select_amount(2000);
    terminal.on_confirm();
    terminal.advance(2);
    terminal.on_confirm();

    terminal.on_confirm();
    type_digits(&mut terminal, "1234");
    terminal.on_confirm();
    assert_eq!(terminal.display().balance_text(), Some(3000));

    terminal.on_quick_select_amount(1000);
    terminal.on_digit(1);
    terminal.run_until_idle(10);
    assert_eq!(terminal.balance(), 2000);
}

#[test]
fn three_wrong_pins_lock_the_card_until_reset() {
    let mut terminal = simulated(AmountPolicy::quick_select());
    terminal.on_confirm();

    for remaining in [2, 1] {
        type_digits(&mut terminal, "0000");
        assert_eq!(
            terminal.on_confirm(),
            StepResult::Rejected(TransactionError::InvalidPin { remaining })
        );
        terminal.advance(2);
        assert_eq!(terminal.phase(), Phase::EnteringPin);
    }

    type_digits(&mut terminal, "0000");
    assert_eq!(
        terminal.on_confirm(),
        StepResult::Rejected(TransactionError::PinLockout)
    );
    assert_eq!(
        terminal.phase(),
        Phase::Error {
            recovery: Recovery::Restart
        }
    );
    assert_eq!(
        terminal.display().error_text(),
        Some("Card blocked. Contact your bank.")
    );

    assert!(terminal.advance(2).is_empty());
    assert_eq!(
        terminal.advance(1),
        vec![StepResult::Transitioned(Phase::Welcome)]
    );
    assert_eq!(terminal.session().pin_attempts(), 0);
    assert_eq!(terminal.balance(), 5000);
}

#[test]
fn lockout_can_be_acknowledged_early() {
    let mut terminal = simulated(AmountPolicy::quick_select());
    terminal.on_confirm();
    for _ in 0..3 {
        type_digits(&mut terminal, "9999");
        terminal.on_confirm();
        terminal.on_confirm();
    }

    assert_eq!(terminal.phase(), Phase::Welcome);
    assert!(terminal.scheduler().is_idle());
    assert!(terminal.advance(5).is_empty());
}

#[test]
fn small_bills_rejects_odd_custom_amount() {
    let mut terminal = signed_in(AmountPolicy::small_bills());
    assert_eq!(
        custom_amount(&mut terminal, "21"),
        StepResult::Rejected(TransactionError::AmountNotMultiple { step: 10 })
    );
    assert_eq!(
        terminal.on_confirm(),
        StepResult::Transitioned(Phase::SelectingAmount)
    );
}

#[test]
fn quick_select_policy_rejects_150() {
    let mut terminal = signed_in(AmountPolicy::quick_select());
    assert_eq!(
        terminal.on_quick_select_amount(150),
        StepResult::Rejected(TransactionError::AmountNotMultiple { step: 100 })
    );
    assert_eq!(terminal.balance(), 5000);
}

#[rstest]
#[case::zero("0", TransactionError::InvalidAmountFormat)]
#[case::below_minimum("15", TransactionError::AmountBelowMinimum { min: 20 })]
#[case::just_below_minimum("19", TransactionError::AmountBelowMinimum { min: 20 })]
#[case::above_maximum("505", TransactionError::AmountAboveMaximum { max: 500 })]
#[case::above_maximum_on_step("510", TransactionError::AmountAboveMaximum { max: 500 })]
fn small_bills_rejects(#[case] digits: &str, #[case] expected: TransactionError) {
    let mut terminal = signed_in(AmountPolicy::small_bills());
    assert_eq!(
        custom_amount(&mut terminal, digits),
        StepResult::Rejected(expected)
    );
    assert_eq!(terminal.phase().recovery(), Some(Recovery::SelectAmount));
}

#[rstest]
#[case::minimum(20)]
#[case::middle(250)]
#[case::maximum(500)]
fn small_bills_accepts(#[case] amount: Amount) {
    let mut terminal = signed_in(AmountPolicy::small_bills());
    assert_eq!(
        custom_amount(&mut terminal, &amount.to_string()),
        StepResult::Transitioned(Phase::Confirming)
    );
    assert_eq!(terminal.session().pending_amount(), Some(amount));
}

#[rstest]
#[case::zero(0, TransactionError::InvalidAmountFormat)]
#[case::below_minimum(50, TransactionError::AmountBelowMinimum { min: 100 })]
#[case::off_step(150, TransactionError::AmountNotMultiple { step: 100 })]
#[case::above_maximum(2100, TransactionError::AmountAboveMaximum { max: 2000 })]
fn quick_select_policy_rejects(#[case] amount: Amount, #[case] expected: TransactionError) {
    let mut quick = signed_in(AmountPolicy::quick_select());
    assert_eq!(
        quick.on_quick_select_amount(amount),
        StepResult::Rejected(expected)
    );

    let mut typed = signed_in(AmountPolicy::quick_select());
    assert_eq!(
        custom_amount(&mut typed, &amount.to_string()),
        StepResult::Rejected(expected)
    );
}

#[rstest]
#[case::confirm_key(None)]
#[case::accept_digit(Some(1))]
fn either_accept_key_starts_processing(#[case] digit: Option<u8>) {
    let mut terminal = signed_in(AmountPolicy::quick_select());
    terminal.on_quick_select_amount(500);
    let result = match digit {
        Some(d) => terminal.on_digit(d),
        None => terminal.on_confirm(),
    };
    assert_eq!(result, StepResult::Transitioned(Phase::Processing));
}

#[test]
fn withdrawal_above_balance_is_refused() {
    let mut terminal = ControllerBuilder::new()
        .opening_balance(300)
        .policy(AmountPolicy::quick_select())
        .display(RecordingDisplay::new())
        .scheduler(ManualScheduler::new())
        .build()
        .unwrap();
    terminal.on_confirm();
    type_digits(&mut terminal, "1234");
    terminal.on_confirm();

    assert_eq!(
        terminal.on_quick_select_amount(400),
        StepResult::Rejected(TransactionError::InsufficientFunds {
            requested: 400,
            available: 300,
        })
    );
    assert_eq!(terminal.display().error_text(), Some("Insufficient funds"));
    assert_eq!(terminal.balance(), 300);
}

#[test]
fn cancel_mid_processing_leaves_balance_untouched() {
    let mut terminal = signed_in(AmountPolicy::quick_select());
    terminal.on_quick_select_amount(700);
    terminal.on_confirm();
    terminal.advance(1);

    assert_eq!(
        terminal.on_cancel(),
        StepResult::Transitioned(Phase::Welcome)
    );
    assert!(terminal.advance(10).is_empty());
    assert_eq!(terminal.balance(), 5000);
    assert_eq!(terminal.phase(), Phase::Welcome);
}

#[test]
fn controller_runs_from_a_custom_config() {
    let config: TerminalConfig = toml::from_str(
        r#"
        opening_balance = 1200

        [pin]
        correct_pin = "4321"
        max_attempts = 2

        [policy]
        preset = "small-bills"
        "#,
    )
    .unwrap();
    let mut terminal =
        Controller::new(&config, RecordingDisplay::new(), ManualScheduler::new()).unwrap();

    terminal.on_confirm();
    type_digits(&mut terminal, "1234");
    assert_eq!(
        terminal.on_confirm(),
        StepResult::Rejected(TransactionError::InvalidPin { remaining: 1 })
    );
    terminal.on_confirm();
    type_digits(&mut terminal, "4321");
    terminal.on_confirm();

    assert!(terminal.on_quick_select_amount(100).is_ignored());
    assert_eq!(
        custom_amount(&mut terminal, "120"),
        StepResult::Transitioned(Phase::Confirming)
    );
    terminal.on_confirm();
    terminal.advance(2);
    assert_eq!(terminal.balance(), 1080);
}

fn with_balance(policy: AmountPolicy, balance: Amount) -> Terminal {
    let mut terminal = ControllerBuilder::new()
        .opening_balance(balance)
        .policy(policy)
        .display(RecordingDisplay::new())
        .scheduler(ManualScheduler::new())
        .build()
        .unwrap();
    terminal.on_confirm();
    type_digits(&mut terminal, "1234");
    terminal.on_confirm();
    terminal
}

#[rstest]
#[case::small_bills(AmountPolicy::small_bills(), 100, "200")]
#[case::quick_select(AmountPolicy::quick_select(), 300, "400")]
fn custom_amount_above_balance_is_refused(
    #[case] policy: AmountPolicy,
    #[case] balance: Amount,
    #[case] digits: &str,
) {
    let mut terminal = with_balance(policy, balance);
    let requested: Amount = digits.parse().unwrap();

    assert_eq!(
        custom_amount(&mut terminal, digits),
        StepResult::Rejected(TransactionError::InsufficientFunds {
            requested,
            available: balance,
        })
    );
    assert_eq!(
        terminal.on_confirm(),
        StepResult::Transitioned(Phase::SelectingAmount)
    );
    assert_eq!(terminal.balance(), balance);
    assert!(terminal.phase().is_authenticated());
}

fn at_pin_entry(terminal: &mut Terminal) {
    terminal.on_confirm();
    type_digits(terminal, "12");
}

fn at_amount_selection(terminal: &mut Terminal) {
    at_pin_entry(terminal);
    type_digits(terminal, "34");
    terminal.on_confirm();
}

fn at_custom_entry(terminal: &mut Terminal) {
    at_amount_selection(terminal);
    terminal.on_enable_custom_amount();
    type_digits(terminal, "5");
}

fn at_confirmation(terminal: &mut Terminal) {
    at_amount_selection(terminal);
    terminal.on_quick_select_amount(200);
}

fn at_processing(terminal: &mut Terminal) {
    at_confirmation(terminal);
    terminal.on_confirm();
}

fn at_success(terminal: &mut Terminal) {
    at_processing(terminal);
    terminal.advance(2);
}

fn at_wrong_pin(terminal: &mut Terminal) {
    terminal.on_confirm();
    type_digits(terminal, "9999");
    terminal.on_confirm();
}

fn at_lockout(terminal: &mut Terminal) {
    terminal.on_confirm();
    for _ in 0..3 {
        type_digits(terminal, "9999");
        terminal.on_confirm();
        terminal.advance(2);
    }
}

fn at_amount_error(terminal: &mut Terminal) {
    at_amount_selection(terminal);
    terminal.on_quick_select_amount(150);
}

#[rstest]
#[case::entering_pin(at_pin_entry, Phase::EnteringPin, 5000)]
#[case::selecting_amount(at_amount_selection, Phase::SelectingAmount, 5000)]
#[case::custom_amount(at_custom_entry, Phase::EnteringCustomAmount, 5000)]
#[case::confirming(at_confirmation, Phase::Confirming, 5000)]
#[case::processing(at_processing, Phase::Processing, 5000)]
#[case::success(at_success, Phase::Success, 4800)]
#[case::wrong_pin(at_wrong_pin, Phase::Error { recovery: Recovery::RetryPin }, 5000)]
#[case::lockout(at_lockout, Phase::Error { recovery: Recovery::Restart }, 5000)]
#[case::amount_error(at_amount_error, Phase::Error { recovery: Recovery::SelectAmount }, 5000)]
fn cancel_clears_the_session_from(
    #[case] reach: fn(&mut Terminal),
    #[case] phase: Phase,
    #[case] balance: Amount,
) {
    let mut terminal = simulated(AmountPolicy::quick_select());
    reach(&mut terminal);
    assert_eq!(terminal.phase(), phase);

    assert_eq!(
        terminal.on_cancel(),
        StepResult::Transitioned(Phase::Welcome)
    );
    let session = terminal.session();
    assert_eq!(session.phase(), Phase::Welcome);
    assert_eq!(session.balance(), balance);
    assert_eq!(session.pin_attempts(), 0);
    assert_eq!(session.entered_pin_len(), 0);
    assert!(session.amount_buffer().is_empty());
    assert_eq!(session.pending_amount(), None);
    assert_eq!(terminal.display().dispensing(), None);
    assert!(terminal.scheduler().is_idle());

    assert!(terminal.advance(10).is_empty());
    assert_eq!(terminal.balance(), balance);
    assert_eq!(terminal.phase(), Phase::Welcome);
}

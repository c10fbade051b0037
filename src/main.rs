//! Cashpoint console - a line-oriented shell around the transaction controller
//!
//! Reads keypad commands from stdin, renders screens as text and drives the
//! controller's delays with a virtual clock that ticks in real time.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use cashpoint::config::{PolicyConfig, TerminalConfig};
use cashpoint::core::{Amount, Input};
use cashpoint::effects::{Display, ManualScheduler, Screen};
use cashpoint::{Controller, StepResult};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const HELP: &str = "\
commands:
  0-9 / 1234     keypad digits
  enter | ok     confirm
  clear          clear the current entry
  cancel         abandon the session
  quick <amount> quick-select an amount
  custom         type a custom amount
  wait [ticks]   skip time ahead
  help           show this text
  quit           leave the terminal";

#[derive(Parser, Debug)]
#[command(name = "cashpoint", version, about = "Simulated cash-withdrawal terminal")]
struct Cli {
    /// Terminal configuration file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the amount policy preset
    #[arg(long, value_enum)]
    policy: Option<PolicyPreset>,

    /// Override the opening balance
    #[arg(long)]
    balance: Option<Amount>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyPreset {
    SmallBills,
    QuickSelect,
}

impl From<PolicyPreset> for PolicyConfig {
    fn from(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::SmallBills => PolicyConfig::SmallBills,
            PolicyPreset::QuickSelect => PolicyConfig::QuickSelect,
        }
    }
}

/// One parsed line of input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Inputs(Vec<Input>),
    Wait(u32),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Inputs(Vec::new()));
    };
    let head = head.to_ascii_lowercase();

    if head.chars().all(|c| c.is_ascii_digit()) {
        let digits = head.bytes().map(|b| Input::Digit(b - b'0')).collect();
        return Ok(Command::Inputs(digits));
    }

    let command = match head.as_str() {
        "enter" | "ok" => Command::Inputs(vec![Input::Confirm]),
        "clear" => Command::Inputs(vec![Input::Clear]),
        "cancel" => Command::Inputs(vec![Input::Cancel]),
        "custom" => Command::Inputs(vec![Input::EnableCustomAmount]),
        "quick" => {
            let amount = words
                .next()
                .context("quick needs an amount")?
                .parse::<Amount>()
                .context("amount must be a whole number")?;
            Command::Inputs(vec![Input::QuickSelect(amount)])
        }
        "wait" => {
            let ticks = match words.next() {
                Some(raw) => raw.parse().context("ticks must be a whole number")?,
                None => 1,
            };
            Command::Wait(ticks)
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command {other:?}, type help"),
    };
    Ok(command)
}

/// Display that prints to stdout.
struct ConsoleDisplay;

impl Display for ConsoleDisplay {
    fn show_screen(&mut self, screen: Screen) {
        let title = match screen {
            Screen::Welcome => "Welcome. Press enter to start",
            Screen::Pin => "Enter your PIN",
            Screen::Withdrawal => "Choose an amount (quick <n> or custom)",
            Screen::CustomAmount => "Type the amount and press enter",
            Screen::Confirmation => "Press 1 to accept, 2 to go back",
            Screen::Processing => "Processing your transaction...",
            Screen::Success => "Please take your cash",
            Screen::Error => "Transaction refused. Press enter",
        };
        println!("== {title} ==");
    }

    fn set_masked_pin(&mut self, length: usize) {
        println!("PIN: {}", "*".repeat(length));
    }

    fn set_amount_text(&mut self, amount: Amount) {
        println!("Amount: ${amount}");
    }

    fn set_balance_text(&mut self, amount: Amount) {
        println!("Balance: ${amount}");
    }

    fn set_error_text(&mut self, message: &str) {
        println!("! {message}");
    }

    fn set_confirmation_details(&mut self, amount: Amount, remaining_balance: Amount) {
        println!("Withdraw ${amount}, remaining balance ${remaining_balance}");
    }

    fn set_success_details(&mut self, amount: Amount, final_balance: Amount) {
        println!("Withdrew ${amount}, balance ${final_balance}");
    }

    fn show_dispense_animation(&mut self, unit_count: u32) {
        println!("[{}]", "$".repeat(unit_count as usize));
    }

    fn hide_dispense_animation(&mut self) {
        println!("[cash tray closed]");
    }
}

fn load_config(cli: &Cli) -> Result<TerminalConfig> {
    let mut config = match &cli.config {
        Some(path) => TerminalConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TerminalConfig::default(),
    };
    if let Some(preset) = cli.policy {
        config.policy = preset.into();
    }
    if let Some(balance) = cli.balance {
        config.opening_balance = balance;
    }
    Ok(config)
}

/// Paces the virtual clock against wall-clock time.
struct TickClock {
    tick: Duration,
    next: Instant,
}

impl TickClock {
    fn new(tick: Duration, now: Instant) -> Self {
        let tick = tick.max(Duration::from_millis(1));
        Self {
            tick,
            next: now + tick,
        }
    }

    /// How long input may be awaited before the next tick is due.
    fn timeout(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Ticks that elapsed up to `now`; the clock is moved past them.
    fn take_elapsed(&mut self, now: Instant) -> u32 {
        let mut ticks = 0;
        while self.next <= now {
            self.next += self.tick;
            ticks += 1;
        }
        ticks
    }
}

/// Read stdin on its own thread so timers keep firing while the prompt waits.
fn spawn_line_reader() -> Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}

fn run(config: TerminalConfig) -> Result<()> {
    let mut controller = Controller::new(&config, ConsoleDisplay, ManualScheduler::new())?;
    let mut clock = TickClock::new(Duration::from_millis(config.tick_millis), Instant::now());
    let lines = spawn_line_reader();
    println!("{HELP}");
    prompt()?;

    loop {
        let line = match lines.recv_timeout(clock.timeout(Instant::now())) {
            Ok(line) => line?,
            Err(RecvTimeoutError::Timeout) => {
                let ticks = clock.take_elapsed(Instant::now());
                if !controller.advance(ticks).is_empty() {
                    prompt()?;
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match parse_command(&line) {
            Ok(Command::Inputs(inputs)) => {
                for input in inputs {
                    if let StepResult::Ignored = controller.handle(input) {
                        println!("(not available now)");
                    }
                }
            }
            Ok(Command::Wait(ticks)) => {
                controller.advance(ticks);
            }
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(e) => println!("{e:#}"),
        }
        prompt()?;
    }

    tracing::info!(balance = controller.balance(), "terminal shut down");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive("cashpoint=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let result = run(config);
    if let Err(e) = &result {
        tracing::error!("Terminal error: {e:#}");
    }
    result
}

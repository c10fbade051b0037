//! Terminal configuration.
//!
//! Every field has a default matching a stock terminal, so an empty file (or
//! no file at all) yields a working quick-select terminal with $5000 loaded.
//! Files are TOML or JSON, picked by extension.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::BuildError;
use crate::core::{Amount, DEFAULT_HISTORY_CAPACITY, PIN_LENGTH};
use crate::effects::Ticks;
use crate::policy::{AmountPolicy, AmountPolicyBuilder};

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format {0:?}, expected .toml or .json")]
    UnsupportedFormat(String),

    #[error("invalid config: {0}")]
    Invalid(#[from] BuildError),
}

/// Complete terminal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Funds loaded in the terminal at start-up
    pub opening_balance: Amount,

    pub pin: PinConfig,

    pub policy: PolicyConfig,

    pub delays: Delays,

    pub dispense: DispenseConfig,

    /// Transition records kept in memory
    pub history_capacity: usize,

    /// Wall-clock length of one tick, used by interactive shells
    pub tick_millis: u64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            opening_balance: 5000,
            pin: PinConfig::default(),
            policy: PolicyConfig::default(),
            delays: Delays::default(),
            dispense: DispenseConfig::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            tick_millis: 250,
        }
    }
}

/// PIN verification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub correct_pin: String,
    pub max_attempts: u32,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            correct_pin: "1234".to_string(),
            max_attempts: 3,
        }
    }
}

impl PinConfig {
    /// The stored PIN as digits, validated.
    pub fn digits(&self) -> Result<Vec<u8>, BuildError> {
        parse_pin(&self.correct_pin)
    }
}

/// Parse a PIN string into its digits.
pub fn parse_pin(pin: &str) -> Result<Vec<u8>, BuildError> {
    let length = pin.chars().count();
    if length != PIN_LENGTH {
        return Err(BuildError::PinLength {
            expected: PIN_LENGTH,
            length,
        });
    }
    pin.chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as u8)
                .ok_or(BuildError::PinNotNumeric)
        })
        .collect()
}

/// Which amount policy the terminal runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "preset", rename_all = "kebab-case")]
pub enum PolicyConfig {
    /// $20 to $500 in steps of $10, custom entry only
    SmallBills,
    /// $100 to $2000 in steps of $100, with quick-select buttons
    #[default]
    QuickSelect,
    Custom {
        min: Amount,
        max: Amount,
        step: Amount,
        #[serde(default)]
        allow_quick_select: bool,
    },
}

impl PolicyConfig {
    pub fn to_policy(self) -> Result<AmountPolicy, BuildError> {
        match self {
            Self::SmallBills => Ok(AmountPolicy::small_bills()),
            Self::QuickSelect => Ok(AmountPolicy::quick_select()),
            Self::Custom {
                min,
                max,
                step,
                allow_quick_select,
            } => AmountPolicyBuilder::new()
                .min(min)
                .max(max)
                .step(step)
                .quick_select(allow_quick_select)
                .build(),
        }
    }
}

impl From<AmountPolicy> for PolicyConfig {
    fn from(policy: AmountPolicy) -> Self {
        if policy == AmountPolicy::small_bills() {
            Self::SmallBills
        } else if policy == AmountPolicy::quick_select() {
            Self::QuickSelect
        } else {
            Self::Custom {
                min: policy.min(),
                max: policy.max(),
                step: policy.step(),
                allow_quick_select: policy.allows_quick_select(),
            }
        }
    }
}

/// Fixed delays, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delays {
    /// Wrong-PIN screen before returning to PIN entry
    pub pin_retry: Ticks,
    /// Lockout screen before the terminal resets
    pub lockout: Ticks,
    /// Transaction processing before cash is dispensed
    pub processing: Ticks,
    /// How long the dispense visual stays up
    pub dispense_visual: Ticks,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            pin_retry: 2,
            lockout: 3,
            processing: 2,
            dispense_visual: 5,
        }
    }
}

/// Dispense visual parameters. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispenseConfig {
    /// Currency represented by one note in the visual
    pub unit_value: Amount,
    /// Most notes drawn at once
    pub max_units: u32,
}

impl Default for DispenseConfig {
    fn default() -> Self {
        Self {
            unit_value: 10,
            max_units: 15,
        }
    }
}

impl DispenseConfig {
    /// Notes to draw for `amount`: one per unit, rounded up, capped.
    pub fn units_for(&self, amount: Amount) -> u32 {
        if self.unit_value == 0 {
            return 0;
        }
        amount.div_ceil(self.unit_value).min(self.max_units)
    }
}

impl TerminalConfig {
    /// Load configuration from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config: Self = match extension.as_str() {
            "toml" => toml::from_str(&contents)?,
            "json" => serde_json::from_str(&contents)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded terminal config");
        Ok(config)
    }

    /// Check every setting the controller depends on.
    pub fn validate(&self) -> Result<(), BuildError> {
        self.pin.digits()?;
        if self.pin.max_attempts == 0 {
            return Err(BuildError::ZeroAttempts);
        }
        self.policy.to_policy()?;
        if self.dispense.unit_value == 0 {
            return Err(BuildError::ZeroUnitValue);
        }
        Ok(())
    }
}

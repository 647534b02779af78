//! Lock panel configuration parameters
//!
//! All tunable parameters for the lock process.  Values are fixed at
//! provisioning time; they can be loaded from a JSON document for the host
//! simulator but are never written back.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest password that still fits the `u16` reference value.
pub const MAX_SUPPORTED_DIGITS: u8 = 4;

/// Action bound to an auxiliary button while a password is being entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxAction {
    /// Increment the digit under edit (wraps 9 → 0).
    DigitUp,
    /// Decrement the digit under edit (wraps 0 → 9).
    DigitDown,
    /// Throw away committed digits and start again at position 0.
    RestartEntry,
    /// Button has no function during entry.
    Ignore,
}

/// Auxiliary button mapping used during password entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuxButtons {
    pub p70: AuxAction,
    pub p71: AuxAction,
}

impl Default for AuxButtons {
    fn default() -> Self {
        Self {
            p70: AuxAction::DigitUp,
            p71: AuxAction::RestartEntry,
        }
    }
}

/// Periods of the four panel timers, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerPeriods {
    /// Periodic display refresh (timerUIGeneral).
    pub ui_general_ms: u32,
    /// Red/blue heartbeat half-period (timerLedBlink).
    pub led_blink_ms: u32,
    /// Yellow entry-indicator half-period (timerYellowLedBlink).
    pub yellow_led_blink_ms: u32,
    /// Entry inactivity timeout (timerUI).
    pub entry_timeout_ms: u32,
}

impl Default for TimerPeriods {
    fn default() -> Self {
        Self {
            ui_general_ms: 1000,
            led_blink_ms: 500,
            yellow_led_blink_ms: 250,
            entry_timeout_ms: 10_000,
        }
    }
}

/// Core lock configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    // --- Password ---
    /// Number of digits in a password (1-4)
    pub max_digits: u8,
    /// Stored reference value, compared for exact equality
    pub password: u16,

    // --- Input ---
    /// Encoder steps needed to move the edited digit by one
    pub encoder_steps_per_digit: u8,
    /// Auxiliary button roles during entry
    pub aux: AuxButtons,

    // --- Feedback ---
    /// Consecutive failures after which the reject buzz becomes long
    pub escalate_after_failures: u8,

    // --- Timing ---
    pub timers: TimerPeriods,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            // Password
            max_digits: 4,
            password: 1234,

            // Input
            encoder_steps_per_digit: 1,
            aux: AuxButtons::default(),

            // Feedback
            escalate_after_failures: 3,

            // Timing
            timers: TimerPeriods::default(),
        }
    }
}

impl LockConfig {
    /// Parse and validate a JSON configuration document.
    /// Missing fields take their default values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: LockConfig = serde_json::from_str(text).map_err(|e| {
            log::warn!("config parse failed: {}", e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values instead of clamping them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_digits == 0 || self.max_digits > MAX_SUPPORTED_DIGITS {
            return Err(ConfigError::ValidationFailed("max_digits must be 1..=4"));
        }
        if u32::from(self.password) > self.max_value() {
            return Err(ConfigError::ValidationFailed(
                "password has more digits than max_digits",
            ));
        }
        if self.encoder_steps_per_digit == 0 {
            return Err(ConfigError::ValidationFailed(
                "encoder_steps_per_digit must be at least 1",
            ));
        }
        if self.escalate_after_failures == 0 {
            return Err(ConfigError::ValidationFailed(
                "escalate_after_failures must be at least 1",
            ));
        }
        let t = &self.timers;
        if t.ui_general_ms == 0
            || t.led_blink_ms == 0
            || t.yellow_led_blink_ms == 0
            || t.entry_timeout_ms == 0
        {
            return Err(ConfigError::ValidationFailed("timer periods must be non-zero"));
        }
        Ok(())
    }

    /// Largest value a `max_digits`-digit entry can assemble.  Saturates
    /// at `u32::MAX` for digit counts that `validate` rejects.
    pub fn max_value(&self) -> u32 {
        10u32
            .checked_pow(u32::from(self.max_digits))
            .map_or(u32::MAX, |limit| limit - 1)
    }
}

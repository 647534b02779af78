//! Process-scoped lock record threaded through every FSM handler.
//!
//! `LockContext` is the single struct that state handlers read from and
//! write to.  It holds password-entry progress, the input read for the
//! event being handled, configuration, the feedback generator and the
//! outbound command buffer.  Handlers never touch hardware: they append
//! [`Command`]s and the service applies them after the event completes.

use crate::config::LockConfig;
use crate::feedback::Feedback;
use crate::timers::{TimerId, TimerMode};

// ---------------------------------------------------------------------------
// Output vocabulary
// ---------------------------------------------------------------------------

/// Discrete indicator LEDs on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Led {
    Red = 0,
    Blue = 1,
    Yellow = 2,
}

impl Led {
    pub const COUNT: usize = 3;
    pub const ALL: [Led; Led::COUNT] = [Led::Red, Led::Blue, Led::Yellow];
}

/// Non-numeric symbols the seven-segment display can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Middle bar: idle, waiting for entry.
    Dash,
    /// "L": locked.
    Locked,
    /// "U": unlocked.
    Unlocked,
}

/// What the seven-segment display should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayContent {
    Blank,
    /// A decimal digit 0–9.
    Digit(u8),
    Glyph(Glyph),
}

/// Buzzer sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerPattern {
    /// Single short pulse: accepted.
    Short,
    /// Two short pulses: rejected.
    DoublePulse,
    /// One long tone: rejected after repeated failures.
    Long,
}

/// Device IO command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoCommand {
    SetLed { led: Led, on: bool },
    Show(DisplayContent),
    Buzz(BuzzerPattern),
}

/// Timer service command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Arm {
        timer: TimerId,
        period_ms: u32,
        mode: TimerMode,
    },
    Disarm(TimerId),
}

/// Side effect requested by a state handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Io(IoCommand),
    Timer(TimerCommand),
}

/// Upper bound on commands produced while handling a single event.
pub const COMMAND_BUFFER_CAP: usize = 24;

pub type CommandBuffer = heapless::Vec<Command, COMMAND_BUFFER_CAP>;

/// Append a command, dropping it (with a warning) if the buffer is full.
pub fn push_command(out: &mut CommandBuffer, cmd: Command) {
    if out.push(cmd).is_err() {
        log::warn!("command buffer full, dropped {:?}", cmd);
    }
}

// ---------------------------------------------------------------------------
// Input snapshot (written by the service before dispatch)
// ---------------------------------------------------------------------------

/// Input read from devices for the event being handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Encoder steps since the last read; only meaningful for `EncoderTurn`.
    pub encoder_delta: i16,
}

/// Result of a finished or abandoned entry, reported to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    Accepted,
    Rejected { consecutive_failures: u8 },
    TimedOut,
}

// ---------------------------------------------------------------------------
// LockContext
// ---------------------------------------------------------------------------

/// The lock record passed to every state handler function.
pub struct LockContext {
    // -- Entry progress --
    /// Position of the digit being edited, `0..max_digits`.
    pub password_index: u8,
    /// Committed digits assembled so far.
    pub unlock_value: u16,
    /// Digit under edit, 0–9.
    pub digit: u8,
    /// Encoder steps not yet worth a whole digit.
    pub encoder_residual: i16,

    // -- Attempt history --
    /// Failed attempts since the last successful unlock.
    pub consecutive_failures: u8,
    /// Set by handlers when an entry completes or is abandoned.
    pub outcome: Option<EntryOutcome>,

    // -- Input --
    pub input: InputSnapshot,

    // -- Configuration --
    pub config: LockConfig,

    // -- Outputs --
    pub feedback: Feedback,
    pub commands: CommandBuffer,
}

impl LockContext {
    /// Create a zeroed record with the given configuration.
    pub fn new(config: LockConfig) -> Self {
        Self {
            password_index: 0,
            unlock_value: 0,
            digit: 0,
            encoder_residual: 0,
            consecutive_failures: 0,
            outcome: None,
            input: InputSnapshot::default(),
            feedback: Feedback::new(config.timers),
            commands: CommandBuffer::new(),
            config,
        }
    }

    /// Reset entry progress to the start of a fresh password.
    pub fn clear_entry(&mut self) {
        self.password_index = 0;
        self.unlock_value = 0;
        self.digit = 0;
        self.encoder_residual = 0;
    }

    /// Positional weight of the digit at `password_index` (MSD first).
    pub fn digit_weight(&self) -> u16 {
        let remaining = self.config.max_digits.saturating_sub(self.password_index + 1);
        10u16.pow(u32::from(remaining))
    }

    /// First broken invariant of the record, if any.
    pub fn check_invariants(&self) -> Option<&'static str> {
        if self.password_index >= self.config.max_digits {
            return Some("password_index out of range");
        }
        if self.digit > 9 {
            return Some("digit out of range");
        }
        if u32::from(self.unlock_value) > self.config.max_value() {
            return Some("unlock_value out of range");
        }
        None
    }

    /// Take the commands produced so far, leaving the buffer empty.
    pub fn take_commands(&mut self) -> CommandBuffer {
        core::mem::take(&mut self.commands)
    }
}

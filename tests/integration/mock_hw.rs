//! Mock panel, timer service and event sink for integration tests.
//!
//! Records every port call so tests can assert on the full command
//! history without touching real pins.

#![allow(dead_code)]

use encoderlock::app::events::AppEvent;
use encoderlock::app::ports::{EncoderPort, EventSink, PanelPort, TimerPort};
use encoderlock::fsm::context::{BuzzerPattern, DisplayContent, Led};
use encoderlock::timers::{TimerId, TimerMode};

// ── Panel call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCall {
    SetLed { led: Led, on: bool },
    Show(DisplayContent),
    Buzz(BuzzerPattern),
    AllOff,
}

// ── MockPanel ─────────────────────────────────────────────────

pub struct MockPanel {
    pub calls: Vec<PanelCall>,
    /// Encoder steps returned by the next `read_delta`.
    pub pending_delta: i16,
    pub encoder_reads: usize,
}

impl MockPanel {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            pending_delta: 0,
            encoder_reads: 0,
        }
    }

    pub fn buzz_count(&self, pattern: BuzzerPattern) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == PanelCall::Buzz(pattern))
            .count()
    }

    pub fn led_writes(&self, led: Led) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PanelCall::SetLed { led: l, .. } if *l == led))
            .count()
    }

    /// Last level written to `led`.
    pub fn led(&self, led: Led) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                PanelCall::SetLed { led: l, on } if *l == led => Some(*on),
                PanelCall::AllOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn shown(&self) -> Option<DisplayContent> {
        self.calls.iter().rev().find_map(|c| match c {
            PanelCall::Show(content) => Some(*content),
            PanelCall::AllOff => Some(DisplayContent::Blank),
            _ => None,
        })
    }
}

impl Default for MockPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelPort for MockPanel {
    fn set_led(&mut self, led: Led, on: bool) {
        self.calls.push(PanelCall::SetLed { led, on });
    }

    fn show(&mut self, content: DisplayContent) {
        self.calls.push(PanelCall::Show(content));
    }

    fn buzz(&mut self, pattern: BuzzerPattern) {
        self.calls.push(PanelCall::Buzz(pattern));
    }

    fn all_off(&mut self) {
        self.calls.push(PanelCall::AllOff);
    }
}

impl EncoderPort for MockPanel {
    fn read_delta(&mut self) -> i16 {
        self.encoder_reads += 1;
        core::mem::take(&mut self.pending_delta)
    }
}

// ── MockTimers ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCall {
    Arm {
        timer: TimerId,
        period_ms: u32,
        mode: TimerMode,
    },
    Disarm(TimerId),
}

/// Timer service that never fires on its own; tests call [`fire`].
///
/// [`fire`]: MockTimers::fire
pub struct MockTimers {
    pub calls: Vec<TimerCall>,
    armed: [bool; TimerId::COUNT],
}

impl MockTimers {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            armed: [false; TimerId::COUNT],
        }
    }

    pub fn disarmed(&self, timer: TimerId) -> bool {
        self.calls.contains(&TimerCall::Disarm(timer))
    }

    /// Expire `timer` as a one-shot would.  Panics if it was not armed,
    /// since a real service could not deliver that event.
    pub fn fire(&mut self, timer: TimerId) {
        assert!(self.is_armed(timer), "{} fired while disarmed", timer.name());
        self.armed[timer as usize] = false;
    }
}

impl Default for MockTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerPort for MockTimers {
    fn arm(&mut self, timer: TimerId, period_ms: u32, mode: TimerMode) {
        self.calls.push(TimerCall::Arm {
            timer,
            period_ms,
            mode,
        });
        self.armed[timer as usize] = true;
    }

    fn disarm(&mut self, timer: TimerId) {
        self.calls.push(TimerCall::Disarm(timer));
        self.armed[timer as usize] = false;
    }

    fn is_armed(&self, timer: TimerId) -> bool {
        self.armed[timer as usize]
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, event: &AppEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

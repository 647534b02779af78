//! Console adapters for the host simulator.
//!
//! [`ConsolePanel`] stands in for the six device handles: it keeps the
//! panel's visible state in memory and lets the operator inject encoder
//! turns.

use core::fmt;

use crate::app::ports::{EncoderPort, PanelPort};
use crate::fsm::context::{BuzzerPattern, DisplayContent, Glyph, Led};

// ───────────────────────────────────────────────────────────────
// ConsolePanel
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ConsolePanel {
    leds: [bool; Led::COUNT],
    display: DisplayContent,
    buzzes: Vec<BuzzerPattern>,
    pending_steps: i16,
    changed: bool,
}

impl ConsolePanel {
    pub fn new() -> Self {
        Self {
            leds: [false; Led::COUNT],
            display: DisplayContent::Blank,
            buzzes: Vec::new(),
            pending_steps: 0,
            changed: false,
        }
    }

    /// Simulate turning the knob by `steps` detents.
    pub fn turn(&mut self, steps: i16) {
        self.pending_steps = self.pending_steps.saturating_add(steps);
    }

    pub fn led(&self, led: Led) -> bool {
        self.leds[led as usize]
    }

    pub fn display(&self) -> DisplayContent {
        self.display
    }

    /// Buzzer patterns started since the last call.
    pub fn take_buzzes(&mut self) -> Vec<BuzzerPattern> {
        core::mem::take(&mut self.buzzes)
    }

    /// Whether anything visible changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        core::mem::take(&mut self.changed)
    }
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line rendering, e.g. `[R . .] L`.
impl fmt::Display for ConsolePanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lamp = |led: Led, c: char| if self.led(led) { c } else { '.' };
        let shown = match self.display {
            DisplayContent::Blank => ' ',
            DisplayContent::Digit(d) => char::from_digit(u32::from(d), 10).unwrap_or('?'),
            DisplayContent::Glyph(Glyph::Dash) => '-',
            DisplayContent::Glyph(Glyph::Locked) => 'L',
            DisplayContent::Glyph(Glyph::Unlocked) => 'U',
        };
        write!(
            f,
            "[{} {} {}] {}",
            lamp(Led::Red, 'R'),
            lamp(Led::Blue, 'B'),
            lamp(Led::Yellow, 'Y'),
            shown
        )
    }
}

impl PanelPort for ConsolePanel {
    fn set_led(&mut self, led: Led, on: bool) {
        if self.leds[led as usize] != on {
            self.leds[led as usize] = on;
            self.changed = true;
        }
    }

    fn show(&mut self, content: DisplayContent) {
        if self.display != content {
            self.display = content;
            self.changed = true;
        }
    }

    fn buzz(&mut self, pattern: BuzzerPattern) {
        self.buzzes.push(pattern);
    }

    fn all_off(&mut self) {
        for led in Led::ALL {
            self.set_led(led, false);
        }
        self.show(DisplayContent::Blank);
    }
}

impl EncoderPort for ConsolePanel {
    fn read_delta(&mut self) -> i16 {
        core::mem::take(&mut self.pending_steps)
    }
}

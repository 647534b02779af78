//! Feedback pattern generator.
//!
//! Translates a logical intent (entry started, accepted, rejected, locked
//! heartbeat) into LED, display, buzzer and timer commands.  Blink cadence
//! comes from the timer periods; each firing flips the associated LED
//! once and re-arms the timer, so toggling is a pure function of "timer
//! fired".
//!
//! ## Patterns
//!
//! | Intent     | LEDs                          | Buzzer          | Timer          |
//! |------------|-------------------------------|-----------------|----------------|
//! | Entry      | yellow blinking               | —               | yellow blink   |
//! | Accepted   | blue solid                    | short pulse     | —              |
//! | Rejected   | red/blue alternating          | double pulse    | led blink      |
//! | Escalated  | red/blue alternating          | long tone       | led blink      |
//! | Locked     | red/blue alternating          | —               | led blink      |
//! | Idle       | all off                       | —               | —              |
//!
//! The only state kept here is which timers are armed and the current
//! LED levels.

use crate::config::TimerPeriods;
use crate::fsm::context::{
    BuzzerPattern, Command, CommandBuffer, DisplayContent, IoCommand, Led, TimerCommand,
    push_command,
};
use crate::timers::{TimerId, TimerMode};

pub struct Feedback {
    periods: TimerPeriods,
    armed: [bool; TimerId::COUNT],
    leds: [bool; Led::COUNT],
}

impl Feedback {
    pub fn new(periods: TimerPeriods) -> Self {
        Self {
            periods,
            armed: [false; TimerId::COUNT],
            leds: [false; Led::COUNT],
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_armed(&self, timer: TimerId) -> bool {
        self.armed[timer as usize]
    }

    pub fn led(&self, led: Led) -> bool {
        self.leds[led as usize]
    }

    /// A one-shot timer delivered its event; the service side no longer
    /// holds it armed.
    pub fn note_fired(&mut self, timer: TimerId) {
        self.armed[timer as usize] = false;
    }

    // ── Intents ───────────────────────────────────────────────

    /// Password entry began: yellow indicator on and blinking, digit shown.
    pub fn entry_started(&mut self, out: &mut CommandBuffer, digit: u8) {
        self.disarm(out, TimerId::LedBlink);
        self.set_led(out, Led::Red, false);
        self.set_led(out, Led::Blue, false);
        self.set_led(out, Led::Yellow, true);
        self.arm(out, TimerId::YellowLedBlink);
        show(out, DisplayContent::Digit(digit));
    }

    /// Digit under edit changed or was committed.
    pub fn entry_progress(&mut self, out: &mut CommandBuffer, digit: u8) {
        show(out, DisplayContent::Digit(digit));
    }

    /// (Re)start the entry inactivity timeout.
    pub fn restart_entry_timeout(&mut self, out: &mut CommandBuffer) {
        self.arm(out, TimerId::UiTimeout);
    }

    /// Password matched: blue solid and a short pulse.  No repeating timer.
    pub fn accepted(&mut self, out: &mut CommandBuffer, content: DisplayContent) {
        self.disarm(out, TimerId::YellowLedBlink);
        self.disarm(out, TimerId::LedBlink);
        self.set_led(out, Led::Yellow, false);
        self.set_led(out, Led::Red, false);
        self.set_led(out, Led::Blue, true);
        show(out, content);
        buzz(out, BuzzerPattern::Short);
    }

    /// Password mismatched: double pulse (long tone when escalated), then
    /// fall back to the locked heartbeat.
    pub fn rejected(&mut self, out: &mut CommandBuffer, escalated: bool, content: DisplayContent) {
        let pattern = if escalated {
            BuzzerPattern::Long
        } else {
            BuzzerPattern::DoublePulse
        };
        buzz(out, pattern);
        self.locked_heartbeat(out, content);
    }

    /// Start the red/blue heartbeat that marks the locked state.
    pub fn locked_heartbeat(&mut self, out: &mut CommandBuffer, content: DisplayContent) {
        self.disarm(out, TimerId::YellowLedBlink);
        self.disarm(out, TimerId::LedBlink);
        self.set_led(out, Led::Yellow, false);
        self.set_led(out, Led::Red, true);
        self.set_led(out, Led::Blue, false);
        show(out, content);
        self.arm(out, TimerId::LedBlink);
    }

    /// Heartbeat timer fired: swap red and blue, re-arm.
    pub fn heartbeat_toggle(&mut self, out: &mut CommandBuffer) {
        let red = !self.led(Led::Red);
        self.set_led(out, Led::Red, red);
        self.set_led(out, Led::Blue, !red);
        self.arm(out, TimerId::LedBlink);
    }

    /// Yellow blink timer fired: flip yellow, re-arm.
    pub fn yellow_toggle(&mut self, out: &mut CommandBuffer) {
        let yellow = !self.led(Led::Yellow);
        self.set_led(out, Led::Yellow, yellow);
        self.arm(out, TimerId::YellowLedBlink);
    }

    /// Periodic refresh fired (or process start): redraw, re-arm.
    pub fn ui_refresh(&mut self, out: &mut CommandBuffer, content: DisplayContent) {
        show(out, content);
        self.arm(out, TimerId::UiGeneral);
    }

    /// Back to rest: stop entry and lock indicators, LEDs off.
    pub fn quiet(&mut self, out: &mut CommandBuffer, content: DisplayContent) {
        self.disarm(out, TimerId::UiTimeout);
        self.disarm(out, TimerId::YellowLedBlink);
        self.disarm(out, TimerId::LedBlink);
        for led in Led::ALL {
            self.set_led(out, led, false);
        }
        show(out, content);
    }

    /// Entry is over: stop the inactivity timeout and the yellow blink.
    /// Both disarms are issued whatever the armed flags say.
    pub fn end_entry(&mut self, out: &mut CommandBuffer) {
        for timer in [TimerId::UiTimeout, TimerId::YellowLedBlink] {
            push_command(out, Command::Timer(TimerCommand::Disarm(timer)));
            self.armed[timer as usize] = false;
        }
    }

    /// Process teardown: every timer disarmed, every output off.
    /// Disarm commands are issued even for timers believed idle.
    pub fn shutdown(&mut self, out: &mut CommandBuffer) {
        for timer in TimerId::ALL {
            push_command(out, Command::Timer(TimerCommand::Disarm(timer)));
            self.armed[timer as usize] = false;
        }
        for led in Led::ALL {
            self.set_led(out, led, false);
        }
        show(out, DisplayContent::Blank);
    }

    // ── Internal ──────────────────────────────────────────────

    fn period_ms(&self, timer: TimerId) -> u32 {
        match timer {
            TimerId::UiGeneral => self.periods.ui_general_ms,
            TimerId::LedBlink => self.periods.led_blink_ms,
            TimerId::YellowLedBlink => self.periods.yellow_led_blink_ms,
            TimerId::UiTimeout => self.periods.entry_timeout_ms,
        }
    }

    /// Arm (or restart) a one-shot; handlers re-arm on every firing.
    fn arm(&mut self, out: &mut CommandBuffer, timer: TimerId) {
        push_command(
            out,
            Command::Timer(TimerCommand::Arm {
                timer,
                period_ms: self.period_ms(timer),
                mode: TimerMode::OneShot,
            }),
        );
        self.armed[timer as usize] = true;
    }

    fn disarm(&mut self, out: &mut CommandBuffer, timer: TimerId) {
        if self.armed[timer as usize] {
            push_command(out, Command::Timer(TimerCommand::Disarm(timer)));
            self.armed[timer as usize] = false;
        }
    }

    fn set_led(&mut self, out: &mut CommandBuffer, led: Led, on: bool) {
        self.leds[led as usize] = on;
        push_command(out, Command::Io(IoCommand::SetLed { led, on }));
    }
}

fn show(out: &mut CommandBuffer, content: DisplayContent) {
    push_command(out, Command::Io(IoCommand::Show(content)));
}

fn buzz(out: &mut CommandBuffer, pattern: BuzzerPattern) {
    push_command(out, Command::Io(IoCommand::Buzz(pattern)));
}

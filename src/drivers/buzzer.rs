//! Non-blocking buzzer sequencer.
//!
//! A pattern is a list of alternating on/off durations, starting with
//! "on".  [`Buzzer::start`] switches the pin on and returns immediately;
//! [`Buzzer::tick`], called from the main loop, advances through the
//! steps.  Starting a pattern while another plays replaces it.

use embedded_hal::digital::OutputPin;

use crate::error::{IoFault, Result};
use crate::fsm::context::BuzzerPattern;

/// On/off durations in milliseconds.
pub fn pattern_steps(pattern: BuzzerPattern) -> &'static [u32] {
    match pattern {
        BuzzerPattern::Short => &[80],
        BuzzerPattern::DoublePulse => &[80, 80, 80],
        BuzzerPattern::Long => &[600],
    }
}

#[derive(Debug, Clone, Copy)]
struct Playing {
    steps: &'static [u32],
    step: usize,
    step_started_ms: u32,
}

pub struct Buzzer<P> {
    pin: P,
    playing: Option<Playing>,
}

impl<P: OutputPin> Buzzer<P> {
    /// Take the pin and silence it.
    pub fn new(pin: P) -> Result<Self> {
        let mut buzzer = Self { pin, playing: None };
        buzzer.write(false)?;
        Ok(buzzer)
    }

    pub fn start(&mut self, pattern: BuzzerPattern, now_ms: u32) -> Result<()> {
        self.playing = Some(Playing {
            steps: pattern_steps(pattern),
            step: 0,
            step_started_ms: now_ms,
        });
        self.write(true)
    }

    /// Advance the pattern.  Safe to call at any rate; late calls skip
    /// straight over steps that have already elapsed.
    pub fn tick(&mut self, now_ms: u32) -> Result<()> {
        let Some(mut playing) = self.playing else {
            return Ok(());
        };

        let mut changed = false;
        while let Some(&duration) = playing.steps.get(playing.step) {
            if now_ms.wrapping_sub(playing.step_started_ms) < duration {
                break;
            }
            playing.step_started_ms = playing.step_started_ms.wrapping_add(duration);
            playing.step += 1;
            changed = true;
        }

        if !changed {
            return Ok(());
        }
        if playing.step >= playing.steps.len() {
            self.playing = None;
            return self.write(false);
        }
        self.playing = Some(playing);
        self.write(playing.step % 2 == 0)
    }

    /// Cut any pattern short.
    pub fn stop(&mut self) -> Result<()> {
        self.playing = None;
        self.write(false)
    }

    pub fn is_active(&self) -> bool {
        self.playing.is_some()
    }

    fn write(&mut self, on: bool) -> Result<()> {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| IoFault::PinWrite.into())
    }
}
